//! CSS selectors for the marketplace review feed, as ordered fallback
//! chains.
//!
//! The frontend ships hashed utility classes that rotate between deploys,
//! so every lookup carries alternatives: `data-testid` hooks first, the
//! currently-observed hashed classes second, loose structural guesses last.
//! Update the hashed entries when extraction starts coming back empty.

use crate::renderer::DomNode;

/// Review article containers, page level.
pub const REVIEW_CONTAINERS: &[&str] = &[
    "article.css-15m2bcr",
    "article[class*='css-15m2bcr']",
    "section#review-feed article",
    "div[class*='review'] article",
];

/// Reviewer display name, inside one article.
pub const REVIEWER_NAME: &[&str] = &["span.name", ".css-k4rf3m span.name", ".name"];

/// Review body text, inside one article.
pub const REVIEW_TEXT: &[&str] = &[
    "span[data-testid='lblItemUlasan']",
    ".css-34x6j7-unf-heading span",
    "p[data-testid='lblItemUlasan']",
];

/// Relative review date, inside one article.
pub const REVIEW_DATE: &[&str] = &[
    "p.css-1rpz5os-unf-heading",
    ".css-6ce5r8 p.css-1rpz5os-unf-heading",
];

/// Purchased-variant label, inside one article.
pub const VARIANT: &[&str] = &["p[data-testid='lblVarian']", ".css-5amcmn-unf-heading"];

/// Star-rating widget inside one article; its `aria-label` reads
/// "bintang N".
pub const STAR_RATING: &str = "div[data-testid='icnStarRating']";

/// Filled star glyphs inside the rating widget (fallback rating source).
pub const FILLED_STARS: &str = "div[data-testid='icnStarRating'] svg[fill*='FFD45F']";

/// Dedicated rating-filter containers in the sidebar, rendered 5→1.
pub const RATING_FILTER_CONTAINERS: &str = "div[data-testid='ratingFilter']";

/// Generic checkbox labels (second filter-detection strategy).
pub const FILTER_LABELS: &str = "label.checkbox";

/// The checkbox input inside a filter container or label.
pub const CHECKBOX: &str = "input[type='checkbox']";

/// Short text nodes that may carry the rating number inside a label.
pub const LABEL_TEXTS: &str = "span, p";

/// The collapsible ratings-accordion toggle.
pub const RATING_ACCORDION: &[&str] = &[
    "button[aria-controls*='Rating']",
    "button[aria-controls*='rating']",
];

/// Next-page pagination controls.
pub const NEXT_PAGE: &[&str] = &[
    "button[aria-label*='Laman berikutnya']",
    "button[aria-label*='next']",
    "button.css-dzvl4q-unf-pagination-item",
    "button.css-5p3bh2-unf-pagination-item",
];

/// Overlays that intercept clicks.
pub const OVERLAYS: &[&str] = &[
    "div[data-unify='Overlay']",
    ".css-1b94wk9-unf-overlay",
    "div[aria-label='unf-overlay']",
    "button[aria-label*='close']",
    "button[aria-label*='tutup']",
];

/// Elements that can host the truncated-text expansion control.
pub const SHOW_MORE_SCOPE: &str = "button, span, a";

/// Text-bearing descendants scanned by the longest-text fallback.
pub const TEXT_BEARING: &str = "span, p";

/// An ordered chain of selector strategies for one field.
///
/// Strategies are tried in order; the first one whose match has non-empty
/// text wins. Absence is a value, not an error.
pub struct FieldLocator {
    pub field: &'static str,
    pub selectors: &'static [&'static str],
}

impl FieldLocator {
    pub const fn new(field: &'static str, selectors: &'static [&'static str]) -> Self {
        Self { field, selectors }
    }

    /// First non-empty text under `scope`, trying each strategy in order.
    pub async fn first_text(&self, scope: &dyn DomNode) -> Option<String> {
        for selector in self.selectors {
            let Ok(matches) = scope.query(selector).await else {
                continue;
            };
            for node in matches {
                if let Ok(text) = node.text().await {
                    if !text.is_empty() {
                        tracing::trace!(field = self.field, selector, "field resolved");
                        return Some(text);
                    }
                }
            }
        }
        None
    }
}

/// Locators for the per-article fields.
pub const NAME_LOCATOR: FieldLocator = FieldLocator::new("reviewer_name", REVIEWER_NAME);
pub const TEXT_LOCATOR: FieldLocator = FieldLocator::new("review_text", REVIEW_TEXT);
pub const DATE_LOCATOR: FieldLocator = FieldLocator::new("review_date", REVIEW_DATE);
pub const VARIANT_LOCATOR: FieldLocator = FieldLocator::new("variant", VARIANT);
