// Copyright 2026 Ulasan Contributors
// SPDX-License-Identifier: Apache-2.0

//! Typed scrape events on a broadcast bus.
//!
//! The bus is a `tokio::sync::broadcast` channel carrying [`ScrapeEvent`]
//! values. Any consumer (the CLI progress printer, an embedding
//! application, a log sink) can subscribe independently. With no
//! subscribers, events are silently dropped.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Everything the scrape pipeline reports while it runs.
/// Serialized to JSON for machine consumers.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ScrapeEvent {
    /// A scrape run has started.
    ScrapeStarted {
        url: String,
        target_ratings: Vec<u8>,
        max_per_rating: usize,
    },
    /// A rating filter was applied and verified exclusive.
    FilterApplied { rating: u8 },
    /// All strategies failed to apply a rating filter; the rating is skipped.
    FilterFailed { rating: u8 },
    /// More than one rating filter was active after apply; repair ran.
    FilterDrift {
        rating: u8,
        active: Vec<u8>,
        repaired: bool,
    },
    /// One page of reviews was collected.
    PageCollected {
        rating: u8,
        page: usize,
        new_reviews: usize,
        duplicates: usize,
    },
    /// A rating's collection pass finished.
    RatingComplete { rating: u8, collected: usize },
    /// The whole run finished.
    ScrapeComplete {
        total_reviews: usize,
        pages_visited: usize,
        elapsed_ms: u64,
    },
    /// The run died on a session-level error.
    ScrapeFailed { error: String },
}

/// The event bus for one process.
///
/// Components emit through this; consumers subscribe for the full stream.
pub struct EventBus {
    sender: broadcast::Sender<ScrapeEvent>,
}

impl EventBus {
    /// Create a bus with the given buffer capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Emit an event to all subscribers. Ignores the no-subscriber case.
    pub fn emit(&self, event: ScrapeEvent) {
        let _ = self.sender.send(event);
    }

    /// Subscribe to all future events.
    pub fn subscribe(&self) -> broadcast::Receiver<ScrapeEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(64)
    }
}
