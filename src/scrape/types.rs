//! Records and configuration for a scrape run.

use crate::error::ScrapeError;
use crate::normalize;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One extracted customer review, raw and normalized forms side by side.
///
/// Field names match the wire schema downstream consumers already parse.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    /// Visible star rating, 0 when extraction failed.
    pub rating: u8,
    pub reviewer_name: String,
    pub reviewer_name_normalized: String,
    pub review_text: String,
    pub review_text_normalized: String,
    /// Free-form relative date ("9 bulan lalu").
    pub review_date: String,
    pub review_date_normalized: String,
    /// Purchased variant, empty when the article shows none.
    pub variant: String,
    pub variant_normalized: String,
    /// The rating filter that was active when this review was collected.
    /// Disagreement with `rating` is a filter-bleed signal, not an error.
    pub rating_filter: u8,
    pub scraped_at: String,
}

impl Review {
    /// Build a review from raw extracted fields, deriving the normalized
    /// forms and stamping the capture time.
    pub fn from_raw(
        rating: u8,
        reviewer_name: String,
        review_text: String,
        review_date: String,
        variant: String,
        rating_filter: u8,
    ) -> Self {
        Self {
            rating,
            reviewer_name_normalized: normalize::clean_name(&reviewer_name),
            reviewer_name,
            review_text_normalized: normalize::normalize_text(&review_text),
            review_text,
            review_date_normalized: normalize::clean_date(&review_date),
            review_date,
            variant_normalized: normalize::clean_variant(&variant),
            variant,
            rating_filter,
            scraped_at: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }

    /// Identity key: two reviews with the same reviewer name and raw text
    /// are the same review.
    pub fn identity(&self) -> (String, String) {
        (self.reviewer_name.clone(), self.review_text.clone())
    }
}

/// Caller-supplied parameters for one scrape run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeConfig {
    /// The review-listing page URL.
    pub url: String,
    /// Ratings to scrape, in order. Subset of 1..=5.
    pub target_ratings: Vec<u8>,
    /// Cap on collected reviews per rating.
    pub max_reviews_per_rating: usize,
    /// Run the browser headless.
    pub headless: bool,
    /// Navigation timeout.
    pub nav_timeout_ms: u64,
    /// Element-presence wait timeout.
    pub wait_timeout_ms: u64,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            target_ratings: vec![1, 2, 3, 4, 5],
            max_reviews_per_rating: 15,
            headless: true,
            nav_timeout_ms: 30_000,
            wait_timeout_ms: 15_000,
        }
    }
}

impl ScrapeConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Reject configs the pipeline cannot honor.
    pub fn validate(&self) -> Result<(), ScrapeError> {
        if self.target_ratings.is_empty() {
            return Err(ScrapeError::InvalidConfig("no target ratings".into()));
        }
        if let Some(bad) = self.target_ratings.iter().find(|r| !(1..=5).contains(*r)) {
            return Err(ScrapeError::InvalidConfig(format!(
                "rating {bad} outside 1..=5"
            )));
        }
        if self.max_reviews_per_rating == 0 {
            return Err(ScrapeError::InvalidConfig(
                "max_reviews_per_rating must be positive".into(),
            ));
        }
        let parsed = url::Url::parse(&self.url)
            .map_err(|e| ScrapeError::InvalidConfig(format!("bad url: {e}")))?;
        let host = parsed.host_str().unwrap_or_default();
        if host != "tokopedia.com" && !host.ends_with(".tokopedia.com") {
            return Err(ScrapeError::InvalidConfig(format!(
                "unexpected marketplace host: {host}"
            )));
        }
        Ok(())
    }
}

/// Aggregate counts for a finished run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScrapeSummary {
    pub total_reviews: usize,
    /// Counts keyed by the visible star rating.
    pub by_rating: BTreeMap<u8, usize>,
    /// Counts keyed by the filter that produced each review.
    pub by_filter: BTreeMap<u8, usize>,
    pub pages_visited: usize,
    pub elapsed_ms: u64,
}

/// Everything a scrape run returns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeOutcome {
    pub reviews: Vec<Review>,
    pub summary: ScrapeSummary,
    pub product: crate::product::ProductInfo,
}
