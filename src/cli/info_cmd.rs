//! `ulasan info <url>` — product metadata from the URL alone, no browser.

use crate::product::ProductInfo;
use anyhow::Result;

pub async fn run(url: &str) -> Result<()> {
    let info = ProductInfo::from_url(url);
    println!("{}", serde_json::to_string_pretty(&info)?);
    Ok(())
}
