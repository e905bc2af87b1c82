//! Per-run session state: the accumulated review collection and its
//! bookkeeping.
//!
//! One session exists per scrape call. It owns the dedup set, so
//! "have we seen this review" is answered in one place, and components
//! below the orchestrator stay pure functions of their inputs plus this
//! handle.

use super::types::{Review, ScrapeSummary};
use std::collections::{BTreeMap, HashSet};
use std::time::Instant;

pub struct ScrapeSession {
    pub id: String,
    reviews: Vec<Review>,
    seen: HashSet<(String, String)>,
    pub pages_visited: usize,
    started: Instant,
}

impl ScrapeSession {
    pub fn new() -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            reviews: Vec::new(),
            seen: HashSet::new(),
            pages_visited: 0,
            started: Instant::now(),
        }
    }

    /// Whether a review with this identity is already collected.
    pub fn is_duplicate(&self, reviewer_name: &str, review_text: &str) -> bool {
        self.seen
            .contains(&(reviewer_name.to_string(), review_text.to_string()))
    }

    /// Append a review unless its identity is already present.
    /// Returns whether it was added.
    pub fn push(&mut self, review: Review) -> bool {
        if !self.seen.insert(review.identity()) {
            return false;
        }
        self.reviews.push(review);
        true
    }

    /// How many reviews were collected under a given rating filter.
    pub fn collected_for(&self, rating: u8) -> usize {
        self.reviews
            .iter()
            .filter(|r| r.rating_filter == rating)
            .count()
    }

    pub fn reviews(&self) -> &[Review] {
        &self.reviews
    }

    pub fn into_reviews(self) -> Vec<Review> {
        self.reviews
    }

    pub fn summary(&self) -> ScrapeSummary {
        let mut by_rating: BTreeMap<u8, usize> = BTreeMap::new();
        let mut by_filter: BTreeMap<u8, usize> = BTreeMap::new();
        for review in &self.reviews {
            *by_rating.entry(review.rating).or_default() += 1;
            *by_filter.entry(review.rating_filter).or_default() += 1;
        }
        ScrapeSummary {
            total_reviews: self.reviews.len(),
            by_rating,
            by_filter,
            pages_visited: self.pages_visited,
            elapsed_ms: self.started.elapsed().as_millis() as u64,
        }
    }
}

impl Default for ScrapeSession {
    fn default() -> Self {
        Self::new()
    }
}
