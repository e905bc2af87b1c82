// Copyright 2026 Ulasan Contributors
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use ulasan::cli;

#[derive(Parser)]
#[command(
    name = "ulasan",
    about = "Ulasan — marketplace review harvester",
    version,
    after_help = "Run 'ulasan <command> --help' for details on each command."
)]
struct Cli {
    /// Output results as JSON (machine-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Suppress non-essential output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Enable verbose/debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape reviews from a product review page
    Scrape {
        /// Review-listing page URL
        url: String,
        /// Ratings to scrape, comma separated (subset of 1-5)
        #[arg(long, value_delimiter = ',', default_value = "1,2,3,4,5")]
        ratings: Vec<u8>,
        /// Maximum reviews collected per rating
        #[arg(long, default_value = "15")]
        max_per_rating: usize,
        /// Run with a visible browser window
        #[arg(long)]
        headful: bool,
        /// Write a CSV export to this path
        #[arg(long)]
        csv: Option<PathBuf>,
        /// Write a sanitized JSONL export to this path
        #[arg(long)]
        jsonl: Option<PathBuf>,
    },
    /// Product and store metadata from the URL alone (no browser)
    Info {
        /// Product or review page URL
        url: String,
    },
    /// Check environment readiness
    Doctor,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Global flags travel via environment so every module can check them.
    if cli.json {
        std::env::set_var("ULASAN_JSON", "1");
    }
    if cli.quiet {
        std::env::set_var("ULASAN_QUIET", "1");
    }

    let default_directive = if cli.verbose { "ulasan=debug" } else { "ulasan=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(default_directive.parse().unwrap()),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Scrape {
            url,
            ratings,
            max_per_rating,
            headful,
            csv,
            jsonl,
        } => cli::scrape_cmd::run(&url, ratings, max_per_rating, headful, csv, jsonl).await,
        Commands::Info { url } => cli::info_cmd::run(&url).await,
        Commands::Doctor => cli::doctor::run().await,
    };

    if let Err(e) = &result {
        if !cli::output::is_quiet() {
            eprintln!("  Error: {e:#}");
        }
        std::process::exit(1);
    }
    Ok(())
}
