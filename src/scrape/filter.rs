//! The rating-filter controller.
//!
//! The most failure-prone part of the pipeline: the sidebar's checkboxes
//! drift (a previous pass leaves one checked, the frontend re-checks one on
//! its own), so applying a filter means clearing everything, clicking the
//! target, then verifying that exactly one filter is active and repairing
//! when it is not. Every strategy list is ordered; the first success wins
//! and nothing is retried beyond its fallbacks.

use super::overlay;
use super::selectors;
use super::{click_with_fallbacks, SETTLE_AFTER_CLICK, SETTLE_SHORT};
use crate::renderer::{DomNode, PageContext};

/// Where the controller believes the page's filter state is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterState {
    /// No rating filter active.
    Unfiltered,
    /// A filter click is in flight.
    Pending(u8),
    /// Exactly the target filter is active, verified.
    Active(u8),
    /// More than one filter (or the wrong one) is active and repair could
    /// not restore exclusivity.
    Drift(Vec<u8>),
}

/// Bulk clear, last resort: click every checked rating checkbox in one
/// script round-trip.
pub(crate) const BULK_CLEAR_SCRIPT: &str = r#"(() => {
    let cleared = 0;
    const boxes = document.querySelectorAll(
        "div[data-testid='ratingFilter'] input[type='checkbox']:checked");
    for (const box of boxes) { box.click(); cleared++; }
    return cleared;
})()"#;

pub struct FilterController<'a> {
    page: &'a dyn PageContext,
    state: FilterState,
}

impl<'a> FilterController<'a> {
    pub fn new(page: &'a dyn PageContext) -> Self {
        Self {
            page,
            state: FilterState::Unfiltered,
        }
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }

    /// Apply the filter for `rating`, exclusively.
    ///
    /// Returns whether a checkbox was located and clicked. Exclusivity is
    /// verified (and repaired) before returning; residual drift lands in
    /// [`FilterState::Drift`] but still counts as applied; downstream
    /// reviews keep their nominal provenance.
    pub async fn apply(&mut self, rating: u8) -> bool {
        overlay::dismiss(self.page).await;
        self.state = FilterState::Pending(rating);

        tracing::debug!(rating, "clearing existing rating filters");
        self.clear_all_boxes().await;
        tokio::time::sleep(SETTLE_SHORT).await;

        self.expand_accordion().await;

        let Some(checkbox) = self.locate_checkbox(rating).await else {
            tracing::warn!(rating, "no strategy located the rating checkbox");
            self.state = FilterState::Unfiltered;
            return false;
        };

        if !checkbox.is_checked().await.unwrap_or(false)
            && click_with_fallbacks(checkbox.as_ref()).await.is_none()
        {
            tracing::warn!(rating, "all click strategies failed on the rating checkbox");
            self.state = FilterState::Unfiltered;
            return false;
        }
        tokio::time::sleep(SETTLE_AFTER_CLICK).await;

        let active = self.verify_exclusive(rating).await;
        tracing::debug!(rating, ?active, state = ?self.state, "filter applied");
        true
    }

    /// Re-scan the page and make sure `{target}` is the only active
    /// filter, repairing drift once if needed. Returns the final active
    /// set.
    pub async fn verify_exclusive(&mut self, target: u8) -> Vec<u8> {
        let active = self.detect_active().await;

        if active.len() == 1 && active[0] == target {
            self.state = FilterState::Active(target);
            return active;
        }

        if active.len() > 1 {
            tracing::warn!(target, ?active, "multiple rating filters active, repairing");
            self.state = FilterState::Drift(active);
            self.repair(target).await;

            let after = self.detect_active().await;
            if after.len() == 1 && after[0] == target {
                self.state = FilterState::Active(target);
            } else {
                tracing::warn!(target, ?after, "repair did not restore exclusivity");
                self.state = FilterState::Drift(after.clone());
            }
            return after;
        }

        tracing::warn!(target, ?active, "unexpected filter state after apply");
        self.state = FilterState::Drift(active.clone());
        active
    }

    /// Uncheck every active rating filter. Returns how many were cleared.
    pub async fn clear_all(&mut self) -> usize {
        let cleared = self.clear_all_boxes().await;
        self.state = FilterState::Unfiltered;
        cleared
    }

    // ── detection ──────────────────────────────────────────────────────

    /// Active ratings, unioned over both detection strategies: dedicated
    /// filter containers (positional) and generic checkbox labels
    /// (text-based).
    async fn detect_active(&self) -> Vec<u8> {
        let mut active = Vec::new();

        if let Ok(containers) = self.page.query(selectors::RATING_FILTER_CONTAINERS).await {
            for (index, container) in containers.iter().enumerate() {
                let Some(rating) = rating_for_position(index) else {
                    continue;
                };
                if checkbox_of(container.as_ref()).await.map(|c| c.1).unwrap_or(false)
                    && !active.contains(&rating)
                {
                    active.push(rating);
                }
            }
        }

        if let Ok(labels) = self.page.query(selectors::FILTER_LABELS).await {
            for label in &labels {
                let Some((_, checked)) = checkbox_of(label.as_ref()).await else {
                    continue;
                };
                if !checked {
                    continue;
                }
                if let Some(rating) = rating_label_text(label.as_ref()).await {
                    if !active.contains(&rating) {
                        active.push(rating);
                    }
                }
            }
        }

        active.sort_unstable();
        active
    }

    // ── location strategies ────────────────────────────────────────────

    async fn locate_checkbox(&self, rating: u8) -> Option<Box<dyn DomNode>> {
        // 1. Label whose short text equals the rating number.
        if let Ok(labels) = self.page.query(selectors::FILTER_LABELS).await {
            for label in labels {
                if rating_label_text(label.as_ref()).await == Some(rating) {
                    if let Ok(mut boxes) = label.query(selectors::CHECKBOX).await {
                        if !boxes.is_empty() {
                            return Some(boxes.remove(0));
                        }
                    }
                }
            }
        }

        // 2. Positional index into the dedicated containers. Assumes the
        // sidebar renders 5 down to 1, which nothing verifies, hence the
        // warn when this is the strategy that fires.
        if let Some(index) = 5usize.checked_sub(rating as usize) {
            let containers = self
                .page
                .query(selectors::RATING_FILTER_CONTAINERS)
                .await
                .unwrap_or_default();
            if let Some(container) = containers.get(index) {
                if let Ok(mut boxes) = container.query(selectors::CHECKBOX).await {
                    if !boxes.is_empty() {
                        tracing::warn!(
                            rating,
                            index,
                            "located checkbox positionally, assuming 5-to-1 sidebar order"
                        );
                        return Some(boxes.remove(0));
                    }
                }
            }
        }

        // 3. Scan every container's short texts for the rating number.
        if let Ok(containers) = self.page.query(selectors::RATING_FILTER_CONTAINERS).await {
            for container in containers {
                if rating_label_text(container.as_ref()).await == Some(rating) {
                    if let Ok(mut boxes) = container.query(selectors::CHECKBOX).await {
                        if !boxes.is_empty() {
                            return Some(boxes.remove(0));
                        }
                    }
                }
            }
        }

        None
    }

    // ── mutation ───────────────────────────────────────────────────────

    /// Uncheck everything except `target`, per-element.
    async fn repair(&self, target: u8) {
        let Ok(containers) = self.page.query(selectors::RATING_FILTER_CONTAINERS).await
        else {
            return;
        };
        for (index, container) in containers.iter().enumerate() {
            let Some(rating) = rating_for_position(index) else {
                continue;
            };
            if rating == target {
                continue;
            }
            if let Ok(boxes) = container.query(selectors::CHECKBOX).await {
                for checkbox in &boxes {
                    if checkbox.is_checked().await.unwrap_or(false)
                        && click_with_fallbacks(checkbox.as_ref()).await.is_some()
                    {
                        tracing::debug!(rating, "cleared drifted filter");
                    }
                }
            }
        }
    }

    /// Three clearing strategies, stopping at the first that clears at
    /// least one box.
    async fn clear_all_boxes(&self) -> usize {
        let mut cleared = 0;

        // 1. Dedicated containers, per-element.
        if let Ok(containers) = self.page.query(selectors::RATING_FILTER_CONTAINERS).await {
            for container in &containers {
                if let Some((checkbox, true)) = checkbox_of(container.as_ref()).await {
                    let _ = checkbox.scroll_into_view().await;
                    if let Some(method) = click_with_fallbacks(checkbox.as_ref()).await {
                        cleared += 1;
                        tracing::debug!(?method, "cleared rating filter");
                    }
                }
            }
        }

        // 2. Generic labels carrying a rating number.
        if cleared == 0 {
            if let Ok(labels) = self.page.query(selectors::FILTER_LABELS).await {
                for label in &labels {
                    if rating_label_text(label.as_ref()).await.is_none() {
                        continue;
                    }
                    if let Some((checkbox, true)) = checkbox_of(label.as_ref()).await {
                        if click_with_fallbacks(checkbox.as_ref()).await.is_some() {
                            cleared += 1;
                        }
                    }
                }
            }
        }

        // 3. Bulk script.
        if cleared == 0 {
            if let Ok(value) = self.page.execute_js(BULK_CLEAR_SCRIPT).await {
                let bulk = value.as_u64().unwrap_or(0) as usize;
                if bulk > 0 {
                    tracing::debug!(bulk, "cleared rating filters via script");
                }
                cleared += bulk;
            }
        }

        cleared
    }

    async fn expand_accordion(&self) {
        for selector in selectors::RATING_ACCORDION {
            let Ok(buttons) = self.page.query(selector).await else {
                continue;
            };
            for button in buttons {
                let collapsed = button
                    .attribute("aria-expanded")
                    .await
                    .ok()
                    .flatten()
                    .as_deref()
                    == Some("false");
                if collapsed {
                    let _ = button.scroll_into_view().await;
                    if click_with_fallbacks(button.as_ref()).await.is_some() {
                        tokio::time::sleep(SETTLE_SHORT).await;
                    }
                    return;
                }
            }
        }
        tracing::debug!("rating accordion absent or already expanded");
    }
}

/// Sidebar position → rating under the assumed 5→1 rendering.
fn rating_for_position(index: usize) -> Option<u8> {
    u8::try_from(5usize.checked_sub(index)?).ok().filter(|r| (1..=5).contains(r))
}

/// The rating number carried by a label's short text nodes, if any.
async fn rating_label_text(scope: &dyn DomNode) -> Option<u8> {
    let texts = scope.query(selectors::LABEL_TEXTS).await.ok()?;
    for node in texts {
        let text = node.text().await.ok()?;
        if let Ok(n) = text.trim().parse::<u8>() {
            if (1..=5).contains(&n) {
                return Some(n);
            }
        }
    }
    None
}

/// A scope's checkbox and its checked state.
async fn checkbox_of(scope: &dyn DomNode) -> Option<(Box<dyn DomNode>, bool)> {
    let mut boxes = scope.query(selectors::CHECKBOX).await.ok()?;
    if boxes.is_empty() {
        return None;
    }
    let checkbox = boxes.remove(0);
    let checked = checkbox.is_checked().await.unwrap_or(false);
    Some((checkbox, checked))
}
