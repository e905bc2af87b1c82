//! Environment readiness check.

use crate::renderer::chromium::find_chromium;
use anyhow::Result;

/// Report OS, architecture and Chromium availability.
pub async fn run() -> Result<()> {
    println!("Ulasan Doctor");
    println!("=============");
    println!();

    let os = std::env::consts::OS;
    let arch = std::env::consts::ARCH;
    println!("OS:   {os}");
    println!("Arch: {arch}");
    println!();

    let chromium = find_chromium();
    match &chromium {
        Some(path) => println!("[OK] Chromium found: {}", path.display()),
        None => println!(
            "[!!] Chromium NOT found. Set ULASAN_CHROMIUM_PATH or install Chrome/Chromium."
        ),
    }

    println!();
    if chromium.is_some() {
        println!("Status: READY");
    } else {
        println!("Status: NOT READY");
    }

    Ok(())
}
