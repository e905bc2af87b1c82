//! Field extraction from a single review article.
//!
//! Every field is independently best-effort: a missing element yields an
//! empty field, never an error. Only an article with neither a reviewer
//! name nor any review text counts as an extraction failure.

use super::selectors::{self, DATE_LOCATOR, NAME_LOCATOR, TEXT_LOCATOR, VARIANT_LOCATOR};
use super::types::Review;
use super::{click_with_fallbacks, SETTLE_SHORT};
use crate::renderer::DomNode;
use regex::Regex;
use std::sync::LazyLock;

static STAR_LABEL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"bintang (\d)").unwrap());

/// The expansion control's exact label. "Pelajari Selengkapnya" is an
/// unrelated seller-education link and must never be clicked.
const SHOW_MORE_LABEL: &str = "selengkapnya";
const UNRELATED_GUARD: &str = "pelajari";

/// Longest-text fallback: anything at or below this length is chrome, not
/// a review.
const MIN_FALLBACK_TEXT_LEN: usize = 20;

/// Row prefixes that mark non-review text in the article.
const NON_REVIEW_PREFIXES: &[&str] =
    &["rating", "bintang", "varian", "helpful", "balas", "laporkan"];

/// All relative dates in the feed end with this ("9 bulan lalu").
const RELATIVE_TIME_SUFFIX: &str = "lalu";

/// Extract one review from its article container.
///
/// Returns `None` when nothing usable was found; the caller logs and
/// moves on.
pub async fn extract_review(article: &dyn DomNode, rating_filter: u8) -> Option<Review> {
    let rating = extract_star_rating(article).await;
    let reviewer_name = NAME_LOCATOR.first_text(article).await.unwrap_or_default();
    let review_text = extract_review_text(article).await.unwrap_or_default();
    let review_date = DATE_LOCATOR.first_text(article).await.unwrap_or_default();
    let variant = VARIANT_LOCATOR
        .first_text(article)
        .await
        .map(|v| strip_variant_prefix(&v))
        .unwrap_or_default();

    if reviewer_name.is_empty() && review_text.is_empty() {
        return None;
    }

    Some(Review::from_raw(
        rating,
        reviewer_name,
        review_text,
        review_date,
        variant,
        rating_filter,
    ))
}

/// Star rating from the widget's "bintang N" aria-label, falling back to
/// counting filled star glyphs. 0 when both fail.
pub async fn extract_star_rating(article: &dyn DomNode) -> u8 {
    if let Ok(widgets) = article.query(selectors::STAR_RATING).await {
        if let Some(widget) = widgets.first() {
            if let Ok(Some(label)) = widget.attribute("aria-label").await {
                if let Some(captures) = STAR_LABEL.captures(&label) {
                    if let Ok(n) = captures[1].parse::<u8>() {
                        if (1..=5).contains(&n) {
                            return n;
                        }
                    }
                }
            }
        }
    }

    if let Ok(filled) = article.query(selectors::FILLED_STARS).await {
        let count = filled.len();
        if (1..=5).contains(&count) {
            return count as u8;
        }
    }

    0
}

/// Review body text: expand a truncated article if a safe control exists,
/// read through the selector chain, then fall back to the longest
/// plausible descendant text.
async fn extract_review_text(article: &dyn DomNode) -> Option<String> {
    expand_truncated(article).await;

    if let Some(text) = TEXT_LOCATOR.first_text(article).await {
        return Some(text);
    }

    longest_text_fallback(article).await
}

/// Click the article's "show more" control if one is safely identified.
/// Returns whether a click landed.
pub(crate) async fn expand_truncated(article: &dyn DomNode) -> bool {
    let Ok(candidates) = article.query(selectors::SHOW_MORE_SCOPE).await else {
        return false;
    };
    for candidate in candidates {
        let own_text = candidate.text().await.unwrap_or_default();
        let parent_text = candidate.parent_text().await.unwrap_or_default();
        if !is_safe_show_more(&own_text, &parent_text) {
            continue;
        }
        if click_with_fallbacks(candidate.as_ref()).await.is_some() {
            tokio::time::sleep(SETTLE_SHORT).await;
            return true;
        }
    }
    false
}

/// The expansion guard: the element's own text must be exactly the
/// show-more label (so "Pelajari Selengkapnya" is rejected on the substring
/// alone), and the parent's text must not mention "pelajari" either.
pub(crate) fn is_safe_show_more(own_text: &str, parent_text: &str) -> bool {
    own_text.trim().eq_ignore_ascii_case(SHOW_MORE_LABEL)
        && !parent_text.to_lowercase().contains(UNRELATED_GUARD)
}

/// Last-resort text source: the longest descendant string that plausibly
/// is the review body.
pub(crate) async fn longest_text_fallback(article: &dyn DomNode) -> Option<String> {
    let nodes = article.query(selectors::TEXT_BEARING).await.ok()?;
    let mut best: Option<String> = None;
    for node in nodes {
        let text = node.text().await.unwrap_or_default();
        if !plausible_review_text(&text) {
            continue;
        }
        if best.as_ref().is_none_or(|b| text.len() > b.len()) {
            best = Some(text);
        }
    }
    best
}

pub(crate) fn plausible_review_text(s: &str) -> bool {
    let trimmed = s.trim();
    if trimmed.len() <= MIN_FALLBACK_TEXT_LEN {
        return false;
    }
    let lower = trimmed.to_lowercase();
    if NON_REVIEW_PREFIXES.iter().any(|p| lower.starts_with(p)) {
        return false;
    }
    if lower.ends_with(RELATIVE_TIME_SUFFIX) {
        return false;
    }
    lower != SHOW_MORE_LABEL
}

fn strip_variant_prefix(variant: &str) -> String {
    variant.replacen("Varian:", "", 1).trim().to_string()
}
