//! Chromium-backed renderer using chromiumoxide.

use super::{DomNode, PageContext, Renderer};
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::element::Element;
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Desktop user agent sent with every page. Marketplace frontends serve a
/// degraded mobile shell to unknown agents.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Find the Chromium binary path.
pub fn find_chromium() -> Option<PathBuf> {
    // 1. ULASAN_CHROMIUM_PATH env
    if let Ok(p) = std::env::var("ULASAN_CHROMIUM_PATH") {
        let path = PathBuf::from(&p);
        if path.exists() {
            return Some(path);
        }
    }

    // 2. ~/.ulasan/chromium/
    if let Some(home) = dirs::home_dir() {
        let candidates = if cfg!(target_os = "macos") {
            vec![
                home.join(".ulasan/chromium/chrome-mac-arm64/Google Chrome for Testing.app/Contents/MacOS/Google Chrome for Testing"),
                home.join(".ulasan/chromium/chrome-mac-x64/Google Chrome for Testing.app/Contents/MacOS/Google Chrome for Testing"),
                home.join(".ulasan/chromium/chrome"),
            ]
        } else {
            vec![
                home.join(".ulasan/chromium/chrome-linux64/chrome"),
                home.join(".ulasan/chromium/chrome"),
            ]
        };
        for c in candidates {
            if c.exists() {
                return Some(c);
            }
        }
    }

    // 3. System PATH
    for name in ["google-chrome", "chromium", "chromium-browser"] {
        if let Ok(path) = which::which(name) {
            return Some(path);
        }
    }

    // 4. Common macOS location
    if cfg!(target_os = "macos") {
        let common =
            PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome");
        if common.exists() {
            return Some(common);
        }
    }

    None
}

/// Chromium-based renderer.
pub struct ChromiumRenderer {
    browser: Browser,
    active_count: Arc<AtomicUsize>,
}

impl ChromiumRenderer {
    /// Launch a Chromium instance, headless unless asked otherwise.
    pub async fn new(headless: bool) -> Result<Self> {
        let chrome_path = find_chromium()
            .context("Chromium not found. Set ULASAN_CHROMIUM_PATH or install Chrome.")?;

        let mut builder = BrowserConfig::builder()
            .chrome_executable(chrome_path)
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .arg("--disable-background-networking")
            .arg("--disable-blink-features=AutomationControlled")
            .arg(format!("--user-agent={USER_AGENT}"));
        if headless {
            builder = builder.arg("--headless=new");
        } else {
            builder = builder.with_head();
        }
        let config = builder
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build browser config: {e}"))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .context("failed to launch Chromium")?;

        // Drain CDP events for the lifetime of the browser.
        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                let _ = event;
            }
        });

        Ok(Self {
            browser,
            active_count: Arc::new(AtomicUsize::new(0)),
        })
    }
}

#[async_trait]
impl Renderer for ChromiumRenderer {
    async fn new_page(&self) -> Result<Box<dyn PageContext>> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .context("failed to create new page")?;

        self.active_count.fetch_add(1, Ordering::Relaxed);

        Ok(Box::new(ChromiumPage {
            page,
            active_count: Arc::clone(&self.active_count),
        }))
    }

    async fn shutdown(&self) -> Result<()> {
        // Browser process exits when the Browser handle drops.
        Ok(())
    }

    fn active_pages(&self) -> usize {
        self.active_count.load(Ordering::Relaxed)
    }
}

/// One Chromium tab.
pub struct ChromiumPage {
    page: Page,
    active_count: Arc<AtomicUsize>,
}

#[async_trait]
impl PageContext for ChromiumPage {
    async fn navigate(&mut self, url: &str, timeout_ms: u64) -> Result<()> {
        let result = tokio::time::timeout(
            Duration::from_millis(timeout_ms),
            self.page.goto(url),
        )
        .await;

        match result {
            Ok(Ok(_)) => {
                let _ = self.page.wait_for_navigation().await;
                Ok(())
            }
            Ok(Err(e)) => bail!("navigation failed: {e}"),
            Err(_) => bail!("navigation timed out after {timeout_ms}ms"),
        }
    }

    async fn query(&self, selector: &str) -> Result<Vec<Box<dyn DomNode>>> {
        let elements = self
            .page
            .find_elements(selector)
            .await
            .unwrap_or_default();
        Ok(elements
            .into_iter()
            .map(|e| Box::new(ChromiumNode { element: e }) as Box<dyn DomNode>)
            .collect())
    }

    async fn wait_for(&self, selector: &str, timeout_ms: u64) -> Result<bool> {
        let deadline = Instant::now() + Duration::from_millis(timeout_ms);
        loop {
            if let Ok(found) = self.page.find_elements(selector).await {
                if !found.is_empty() {
                    return Ok(true);
                }
            }
            if Instant::now() >= deadline {
                return Ok(false);
            }
            tokio::time::sleep(Duration::from_millis(200)).await;
        }
    }

    async fn execute_js(&self, script: &str) -> Result<serde_json::Value> {
        let result = self
            .page
            .evaluate(script)
            .await
            .context("JS execution failed")?;
        Ok(result.into_value().unwrap_or(serde_json::Value::Null))
    }

    async fn scroll_to_bottom(&self) -> Result<()> {
        let _ = self
            .page
            .evaluate("window.scrollTo(0, document.body.scrollHeight)")
            .await;
        Ok(())
    }

    async fn press_escape(&self) -> Result<()> {
        let _ = self
            .page
            .evaluate(
                "document.body.dispatchEvent(new KeyboardEvent('keydown', \
                 { key: 'Escape', bubbles: true }))",
            )
            .await;
        Ok(())
    }

    async fn url(&self) -> Result<String> {
        let url = self
            .page
            .url()
            .await
            .context("failed to get URL")?
            .map(|u| u.to_string())
            .unwrap_or_default();
        Ok(url)
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.active_count.fetch_sub(1, Ordering::Relaxed);
        let _ = self.page.close().await;
        Ok(())
    }
}

/// Handle to one element on a Chromium page.
pub struct ChromiumNode {
    element: Element,
}

impl ChromiumNode {
    /// Call a JS function with `this` bound to the element, returning its
    /// value.
    async fn js_value(&self, function: &str) -> Result<serde_json::Value> {
        let ret = self
            .element
            .call_js_fn(function, false)
            .await
            .context("element JS call failed")?;
        Ok(ret.result.value.unwrap_or(serde_json::Value::Null))
    }
}

#[async_trait]
impl DomNode for ChromiumNode {
    async fn query(&self, selector: &str) -> Result<Vec<Box<dyn DomNode>>> {
        let elements = self
            .element
            .find_elements(selector)
            .await
            .unwrap_or_default();
        Ok(elements
            .into_iter()
            .map(|e| Box::new(ChromiumNode { element: e }) as Box<dyn DomNode>)
            .collect())
    }

    async fn text(&self) -> Result<String> {
        let text = self
            .element
            .inner_text()
            .await
            .context("failed to read text")?
            .unwrap_or_default();
        Ok(text.trim().to_string())
    }

    async fn parent_text(&self) -> Result<String> {
        let value = self
            .js_value(
                "function() { return this.parentElement ? \
                 (this.parentElement.innerText || '') : ''; }",
            )
            .await?;
        Ok(value.as_str().unwrap_or_default().trim().to_string())
    }

    async fn attribute(&self, name: &str) -> Result<Option<String>> {
        self.element
            .attribute(name)
            .await
            .context("failed to read attribute")
    }

    async fn click(&self) -> Result<()> {
        self.element.click().await.context("click failed")?;
        Ok(())
    }

    async fn click_via_js(&self) -> Result<()> {
        self.js_value("function() { this.click(); }").await?;
        Ok(())
    }

    async fn scroll_into_view(&self) -> Result<()> {
        self.element
            .scroll_into_view()
            .await
            .context("scroll into view failed")?;
        Ok(())
    }

    async fn is_checked(&self) -> Result<bool> {
        let value = self
            .js_value("function() { return this.checked === true; }")
            .await?;
        Ok(value.as_bool().unwrap_or(false))
    }

    async fn is_enabled(&self) -> Result<bool> {
        let value = self
            .js_value("function() { return !this.disabled; }")
            .await?;
        Ok(value.as_bool().unwrap_or(false))
    }

    async fn is_visible(&self) -> Result<bool> {
        let value = self
            .js_value(
                "function() { const r = this.getBoundingClientRect(); \
                 return !!(r.width || r.height) && \
                 getComputedStyle(this).visibility !== 'hidden'; }",
            )
            .await?;
        Ok(value.as_bool().unwrap_or(false))
    }

    async fn hide(&self) -> Result<()> {
        self.js_value("function() { this.style.display = 'none'; }")
            .await?;
        Ok(())
    }
}
