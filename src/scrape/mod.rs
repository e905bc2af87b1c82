//! The review-extraction pipeline.
//!
//! Flow runs strictly downward: [`orchestrator`] drives [`filter`],
//! [`paginate`] and [`collect`]; the collector calls [`extract`] per
//! article; extraction leans on the normalizer. Everything below the
//! orchestrator is best-effort: failures fall through fallback strategies
//! or skip the unit of work, they never abort the session.

pub mod collect;
pub mod extract;
pub mod filter;
pub mod orchestrator;
pub mod overlay;
pub mod paginate;
pub mod selectors;
pub mod session;
pub mod types;

use crate::renderer::{DomNode, PageContext};
use std::time::Duration;

/// Settle pause after a click that mutates the feed (filter toggle,
/// pagination).
pub(crate) const SETTLE_AFTER_CLICK: Duration = Duration::from_millis(1500);

/// Shorter pause for in-article mutations (text expansion).
pub(crate) const SETTLE_SHORT: Duration = Duration::from_millis(400);

/// Which click strategy landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickMethod {
    Direct,
    Script,
    Scrolled,
}

/// Click a node, trying strategies in order: native click, script click,
/// scroll-into-view then native click. Returns the method that worked.
pub(crate) async fn click_with_fallbacks(node: &dyn DomNode) -> Option<ClickMethod> {
    if node.click().await.is_ok() {
        return Some(ClickMethod::Direct);
    }
    tracing::debug!("direct click failed, trying script click");
    if node.click_via_js().await.is_ok() {
        return Some(ClickMethod::Script);
    }
    tracing::debug!("script click failed, trying scrolled click");
    if node.scroll_into_view().await.is_ok() && node.click().await.is_ok() {
        return Some(ClickMethod::Scrolled);
    }
    None
}

/// Wait until review containers are present, then let lazy content load.
///
/// Absence after the timeout is not an error; the caller decides what an
/// empty page means.
pub(crate) async fn wait_for_feed(page: &dyn PageContext, timeout_ms: u64) -> bool {
    let found = page
        .wait_for(selectors::REVIEW_CONTAINERS[0], timeout_ms)
        .await
        .unwrap_or(false);
    let _ = page.scroll_to_bottom().await;
    tokio::time::sleep(SETTLE_SHORT).await;
    found
}
