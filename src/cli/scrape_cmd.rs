//! `ulasan scrape <url>` — run a full scrape session and print or save the
//! results.

use super::output;
use crate::events::{EventBus, ScrapeEvent};
use crate::export;
use crate::renderer::chromium::ChromiumRenderer;
use crate::scrape::orchestrator;
use crate::scrape::types::ScrapeConfig;
use anyhow::{Context, Result};
use std::path::PathBuf;

pub async fn run(
    url: &str,
    ratings: Vec<u8>,
    max_per_rating: usize,
    headful: bool,
    csv_out: Option<PathBuf>,
    jsonl_out: Option<PathBuf>,
) -> Result<()> {
    let config = ScrapeConfig {
        url: url.to_string(),
        target_ratings: ratings,
        max_reviews_per_rating: max_per_rating,
        headless: !headful,
        ..Default::default()
    };

    let bus = EventBus::default();
    let printer = spawn_progress_printer(&bus);

    let renderer = ChromiumRenderer::new(config.headless)
        .await
        .context("could not start the browser")?;

    let outcome = orchestrator::run(&renderer, &config, &bus).await?;

    // Closing the bus lets the printer drain and exit.
    drop(bus);
    let _ = printer.await;

    if let Some(path) = csv_out {
        let rows = export::save_csv(&outcome.reviews, &path)?;
        if !output::is_quiet() {
            eprintln!("  wrote {rows} rows to {}", path.display());
        }
    }
    if let Some(path) = jsonl_out {
        let lines = export::save_jsonl(&outcome.reviews, &path)?;
        if !output::is_quiet() {
            eprintln!("  wrote {lines} lines to {}", path.display());
        }
    }

    if output::is_json() {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    let summary = &outcome.summary;
    println!(
        "{} — {} reviews across {} pages in {}ms",
        outcome.product.product_name,
        summary.total_reviews,
        summary.pages_visited,
        summary.elapsed_ms
    );
    if !summary.by_rating.is_empty() {
        println!("By rating:");
        for (rating, count) in &summary.by_rating {
            println!("  {rating} bintang: {count}");
        }
        println!("By filter applied:");
        for (rating, count) in &summary.by_filter {
            println!("  filter {rating}: {count}");
        }
    }

    Ok(())
}

/// Mirror scrape events to stderr while the run is in flight.
fn spawn_progress_printer(bus: &EventBus) -> tokio::task::JoinHandle<()> {
    use tokio::sync::broadcast::error::RecvError;

    let mut events = bus.subscribe();
    tokio::spawn(async move {
        loop {
            let event = match events.recv().await {
                Ok(event) => event,
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            };
            if output::is_quiet() || output::is_json() {
                continue;
            }
            match event {
                ScrapeEvent::ScrapeStarted { url, target_ratings, .. } => {
                    eprintln!("  scraping {url} for ratings {target_ratings:?}");
                }
                ScrapeEvent::FilterApplied { rating } => {
                    eprintln!("  filter {rating} applied");
                }
                ScrapeEvent::FilterFailed { rating } => {
                    eprintln!("  filter {rating} failed, skipping");
                }
                ScrapeEvent::FilterDrift { rating, active, .. } => {
                    eprintln!("  filter {rating} drifted (active: {active:?})");
                }
                ScrapeEvent::PageCollected { rating, page, new_reviews, duplicates } => {
                    eprintln!(
                        "  rating {rating} page {page}: {new_reviews} new, {duplicates} duplicate"
                    );
                }
                ScrapeEvent::RatingComplete { rating, collected } => {
                    eprintln!("  rating {rating} done: {collected} collected");
                }
                ScrapeEvent::ScrapeComplete { total_reviews, .. } => {
                    eprintln!("  done: {total_reviews} reviews");
                }
                ScrapeEvent::ScrapeFailed { error } => {
                    eprintln!("  failed: {error}");
                }
            }
        }
    })
}
