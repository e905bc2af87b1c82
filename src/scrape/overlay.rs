//! Dismissal of overlays that intercept clicks.
//!
//! Promo modals and cookie sheets appear at unpredictable points, so every
//! click-heavy step dismisses first. Failure is fine: if nothing matched,
//! nothing was blocking.

use super::selectors;
use crate::renderer::PageContext;

/// Close or hide any visible overlay, then send Escape for good measure.
pub async fn dismiss(page: &dyn PageContext) {
    for selector in selectors::OVERLAYS {
        let Ok(overlays) = page.query(selector).await else {
            continue;
        };
        for overlay in overlays {
            if !overlay.is_visible().await.unwrap_or(false) {
                continue;
            }
            tracing::debug!(selector, "dismissing overlay");
            if overlay.click().await.is_err() {
                let _ = overlay.hide().await;
            }
        }
    }
    let _ = page.press_escape().await;
}
