//! Collection of all reviews on the currently loaded page.

use super::extract;
use super::selectors;
use super::session::ScrapeSession;
use super::types::Review;
use super::wait_for_feed;
use crate::renderer::PageContext;

/// What one page yielded.
#[derive(Debug, Default)]
pub struct PageHarvest {
    /// Reviews new to the session, in DOM order.
    pub new_reviews: Vec<Review>,
    /// Articles discarded because their identity was already collected.
    pub duplicates: usize,
    /// Articles that yielded nothing extractable.
    pub failed: usize,
}

/// Collect up to `quota` new reviews from the current page.
///
/// Deduplication happens against the session before insertion, so the
/// returned set is already disjoint from everything collected earlier.
/// Best-effort: any page-level trouble comes back as an empty harvest.
pub async fn collect_page(
    page: &dyn PageContext,
    session: &mut ScrapeSession,
    rating_filter: u8,
    quota: usize,
    wait_timeout_ms: u64,
) -> PageHarvest {
    let mut harvest = PageHarvest::default();
    if quota == 0 {
        return harvest;
    }

    wait_for_feed(page, wait_timeout_ms).await;

    let mut containers = Vec::new();
    for selector in selectors::REVIEW_CONTAINERS {
        match page.query(selector).await {
            Ok(found) if !found.is_empty() => {
                tracing::debug!(selector, count = found.len(), "review containers located");
                containers = found;
                break;
            }
            _ => continue,
        }
    }
    if containers.is_empty() {
        tracing::debug!("no review containers on this page");
        return harvest;
    }

    // Do not scrape articles we would only throw away.
    containers.truncate(quota);

    for article in &containers {
        let Some(review) = extract::extract_review(article.as_ref(), rating_filter).await
        else {
            harvest.failed += 1;
            continue;
        };
        if session.is_duplicate(&review.reviewer_name, &review.review_text) {
            tracing::debug!(reviewer = %review.reviewer_name, "duplicate review skipped");
            harvest.duplicates += 1;
            continue;
        }
        session.push(review.clone());
        harvest.new_reviews.push(review);
        if harvest.new_reviews.len() >= quota {
            break;
        }
    }

    harvest
}
