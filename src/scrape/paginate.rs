//! Pagination through the review feed.

use super::overlay;
use super::selectors;
use super::{wait_for_feed, SETTLE_AFTER_CLICK};
use crate::renderer::PageContext;

/// Hard ceiling on pages visited per rating, a circuit breaker against
/// pagination-detection bugs looping forever. Enforced by the
/// orchestrator.
pub const MAX_PAGES_PER_RATING: usize = 10;

/// Advance to the next page of reviews.
///
/// Returns `false` when no enabled, visible next-page control exists (the
/// normal end-of-results condition) or when every click strategy failed.
pub async fn next_page(page: &dyn PageContext, wait_timeout_ms: u64) -> bool {
    overlay::dismiss(page).await;

    let mut button = None;
    for selector in selectors::NEXT_PAGE {
        let Ok(candidates) = page.query(selector).await else {
            continue;
        };
        for candidate in candidates {
            if candidate.is_enabled().await.unwrap_or(false)
                && candidate.is_visible().await.unwrap_or(false)
            {
                tracing::debug!(selector, "next-page control located");
                button = Some(candidate);
                break;
            }
        }
        if button.is_some() {
            break;
        }
    }

    let Some(button) = button else {
        tracing::debug!("no next-page control, end of results");
        return false;
    };

    // Scrolled click first (the control sits below the fold), then the
    // script dispatch, then a plain click.
    let clicked = if button.scroll_into_view().await.is_ok() && button.click().await.is_ok() {
        true
    } else if button.click_via_js().await.is_ok() {
        true
    } else {
        button.click().await.is_ok()
    };
    if !clicked {
        tracing::warn!("next-page control resisted every click strategy");
        return false;
    }

    tokio::time::sleep(SETTLE_AFTER_CLICK).await;
    wait_for_feed(page, wait_timeout_ms).await;
    true
}
