//! Browser abstraction for the extraction pipeline.
//!
//! Three traits split the seam: [`Renderer`] launches the engine and hands
//! out pages, [`PageContext`] is one live tab, [`DomNode`] is a handle to
//! one element on it. The scrape pipeline only ever talks to these traits,
//! so it runs identically against real Chromium and against the scripted
//! DOM used in tests.

pub mod chromium;
#[cfg(test)]
pub mod mock;

use anyhow::Result;
use async_trait::async_trait;

/// A browser engine that can open pages.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Open a new page (tab).
    async fn new_page(&self) -> Result<Box<dyn PageContext>>;
    /// Shut down the engine.
    async fn shutdown(&self) -> Result<()>;
    /// Number of currently open pages.
    fn active_pages(&self) -> usize;
}

/// A single live page.
#[async_trait]
pub trait PageContext: Send + Sync {
    /// Navigate to a URL, bounded by a timeout.
    async fn navigate(&mut self, url: &str, timeout_ms: u64) -> Result<()>;
    /// All elements matching a CSS selector, in DOM order.
    async fn query(&self, selector: &str) -> Result<Vec<Box<dyn DomNode>>>;
    /// Poll until the selector matches at least once or the timeout runs
    /// out. Returns whether it matched; a timeout is not an error.
    async fn wait_for(&self, selector: &str, timeout_ms: u64) -> Result<bool>;
    /// Execute JavaScript in the page and return its value.
    async fn execute_js(&self, script: &str) -> Result<serde_json::Value>;
    /// Scroll the viewport to the bottom of the document.
    async fn scroll_to_bottom(&self) -> Result<()>;
    /// Send an Escape key to the page (modal dismissal).
    async fn press_escape(&self) -> Result<()>;
    /// Current URL.
    async fn url(&self) -> Result<String>;
    /// Close this page.
    async fn close(self: Box<Self>) -> Result<()>;
}

/// A handle to one element on a live page.
///
/// Reads are best-effort: callers treat `Err` the same as "not there" and
/// move on to the next fallback strategy.
#[async_trait]
pub trait DomNode: Send + Sync {
    /// Descendant elements matching a CSS selector, in DOM order.
    async fn query(&self, selector: &str) -> Result<Vec<Box<dyn DomNode>>>;
    /// Rendered text content, trimmed.
    async fn text(&self) -> Result<String>;
    /// Rendered text of the immediate parent element.
    async fn parent_text(&self) -> Result<String>;
    /// Attribute value, if present.
    async fn attribute(&self, name: &str) -> Result<Option<String>>;
    /// Native click.
    async fn click(&self) -> Result<()>;
    /// Script-dispatched click, for when the native one is intercepted.
    async fn click_via_js(&self) -> Result<()>;
    /// Scroll the element into view.
    async fn scroll_into_view(&self) -> Result<()>;
    /// Checkbox/radio checked state.
    async fn is_checked(&self) -> Result<bool>;
    /// Not disabled.
    async fn is_enabled(&self) -> Result<bool>;
    /// Takes up layout space and is not visibility:hidden.
    async fn is_visible(&self) -> Result<bool>;
    /// Hide the element via inline style (last-resort overlay removal).
    async fn hide(&self) -> Result<()>;
}

/// A no-op renderer for environments without a browser.
///
/// Lets the CLI surface (doctor, info) and the pure pipeline pieces work
/// when Chromium is absent; any attempt to open a page reports the miss.
pub struct NoopRenderer;

#[async_trait]
impl Renderer for NoopRenderer {
    async fn new_page(&self) -> Result<Box<dyn PageContext>> {
        Err(anyhow::anyhow!("browser not available"))
    }
    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }
    fn active_pages(&self) -> usize {
        0
    }
}
