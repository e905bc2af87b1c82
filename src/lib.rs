// Copyright 2026 Ulasan Contributors
// SPDX-License-Identifier: Apache-2.0

//! Ulasan — marketplace review harvester.
//!
//! Drives a real Chromium instance through a paginated, rating-filtered
//! review feed, extracts structured records per review, normalizes the
//! text, and persists analysis-ready artifacts. One scrape call owns one
//! browser page exclusively; everything below the orchestrator is
//! best-effort and partial results are the expected outcome.

pub mod cli;
pub mod error;
pub mod events;
pub mod export;
pub mod normalize;
pub mod product;
pub mod renderer;
pub mod scrape;

pub use error::ScrapeError;
pub use scrape::types::{Review, ScrapeConfig, ScrapeOutcome, ScrapeSummary};
