//! Scripted in-memory DOM for pipeline tests.
//!
//! The production code queries fixed selector constants, so the mock does
//! not need a CSS engine: nodes are registered under the exact selector
//! strings the pipeline will ask for, page-level or per parent node.
//! Clicks can carry effects (toggle a checkbox, reveal truncated text,
//! advance to the next page) so the filter, expansion and pagination state
//! machines run end to end without a browser.

use super::{DomNode, PageContext, Renderer};
use anyhow::{bail, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub type NodeId = usize;

/// What happens when a node is clicked.
#[derive(Clone, Default)]
pub enum ClickEffect {
    #[default]
    None,
    /// Flip the node's own checked state.
    ToggleChecked,
    /// Replace another node's text (truncation expansion).
    SetText { target: NodeId, text: String },
    /// Advance the mock to its next page, if one exists.
    NextPage,
}

/// Declarative node description for tests.
#[derive(Clone)]
pub struct NodeSpec {
    text: String,
    attrs: Vec<(String, String)>,
    checked: bool,
    enabled: bool,
    visible: bool,
    direct_click_fails: bool,
    effect: ClickEffect,
}

impl NodeSpec {
    pub fn new() -> Self {
        Self {
            text: String::new(),
            attrs: Vec::new(),
            checked: false,
            enabled: true,
            visible: true,
            direct_click_fails: false,
            effect: ClickEffect::None,
        }
    }

    pub fn text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.push((name.to_string(), value.to_string()));
        self
    }

    pub fn checked(mut self, checked: bool) -> Self {
        self.checked = checked;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Make the native click fail, so only the script click works.
    pub fn fail_direct_click(mut self) -> Self {
        self.direct_click_fails = true;
        self
    }

    pub fn effect(mut self, effect: ClickEffect) -> Self {
        self.effect = effect;
        self
    }
}

impl Default for NodeSpec {
    fn default() -> Self {
        Self::new()
    }
}

struct NodeData {
    spec: NodeSpec,
    clicks: usize,
    parent: Option<NodeId>,
    children: HashMap<String, Vec<NodeId>>,
}

struct DomState {
    nodes: Vec<NodeData>,
    /// Page-level registries, one per page in the pagination sequence.
    pages: Vec<HashMap<String, Vec<NodeId>>>,
    /// Persistent chrome (filter sidebar) visible on every page.
    global: HashMap<String, Vec<NodeId>>,
    current: usize,
    navigations: Vec<String>,
    escapes: usize,
    scrolls: usize,
    closes: usize,
}

/// A scripted page usable wherever a [`PageContext`] is expected.
#[derive(Clone)]
pub struct MockPage {
    state: Arc<Mutex<DomState>>,
}

impl MockPage {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(DomState {
                nodes: Vec::new(),
                pages: vec![HashMap::new()],
                global: HashMap::new(),
                current: 0,
                navigations: Vec::new(),
                escapes: 0,
                scrolls: 0,
                closes: 0,
            })),
        }
    }

    /// Append another page to the pagination sequence; returns its index.
    pub fn add_page(&self) -> usize {
        let mut state = self.state.lock().unwrap();
        state.pages.push(HashMap::new());
        state.pages.len() - 1
    }

    pub fn add_node(&self, spec: NodeSpec) -> NodeId {
        let mut state = self.state.lock().unwrap();
        state.nodes.push(NodeData {
            spec,
            clicks: 0,
            parent: None,
            children: HashMap::new(),
        });
        state.nodes.len() - 1
    }

    /// Register a node under a selector at page level.
    pub fn place(&self, page: usize, selector: &str, id: NodeId) {
        let mut state = self.state.lock().unwrap();
        state.pages[page]
            .entry(selector.to_string())
            .or_default()
            .push(id);
    }

    /// Register a node under a selector visible on every page.
    pub fn place_global(&self, selector: &str, id: NodeId) {
        let mut state = self.state.lock().unwrap();
        state
            .global
            .entry(selector.to_string())
            .or_default()
            .push(id);
    }

    /// Register `id` as a child of `parent` under a selector.
    pub fn attach(&self, parent: NodeId, selector: &str, id: NodeId) {
        let mut state = self.state.lock().unwrap();
        state.nodes[id].parent = Some(parent);
        state.nodes[parent]
            .children
            .entry(selector.to_string())
            .or_default()
            .push(id);
    }

    /// A [`DomNode`] handle to any node, registered or not.
    pub fn handle(&self, id: NodeId) -> Box<dyn DomNode> {
        Box::new(MockNode {
            id,
            state: Arc::clone(&self.state),
        })
    }

    // ── test observers ─────────────────────────────────────────────────

    /// Force a checkbox state from outside (simulates filter drift).
    pub fn set_checked(&self, id: NodeId, checked: bool) {
        self.state.lock().unwrap().nodes[id].spec.checked = checked;
    }

    pub fn is_checked(&self, id: NodeId) -> bool {
        self.state.lock().unwrap().nodes[id].spec.checked
    }

    pub fn clicks(&self, id: NodeId) -> usize {
        self.state.lock().unwrap().nodes[id].clicks
    }

    pub fn current_page(&self) -> usize {
        self.state.lock().unwrap().current
    }

    pub fn closes(&self) -> usize {
        self.state.lock().unwrap().closes
    }

    pub fn navigations(&self) -> Vec<String> {
        self.state.lock().unwrap().navigations.clone()
    }
}

impl Default for MockPage {
    fn default() -> Self {
        Self::new()
    }
}

fn apply_click(state: &mut DomState, id: NodeId) {
    state.nodes[id].clicks += 1;
    match state.nodes[id].spec.effect.clone() {
        ClickEffect::None => {}
        ClickEffect::ToggleChecked => {
            state.nodes[id].spec.checked = !state.nodes[id].spec.checked;
        }
        ClickEffect::SetText { target, text } => {
            state.nodes[target].spec.text = text;
        }
        ClickEffect::NextPage => {
            if state.current + 1 < state.pages.len() {
                state.current += 1;
            }
        }
    }
}

#[async_trait]
impl PageContext for MockPage {
    async fn navigate(&mut self, url: &str, _timeout_ms: u64) -> Result<()> {
        self.state.lock().unwrap().navigations.push(url.to_string());
        Ok(())
    }

    async fn query(&self, selector: &str) -> Result<Vec<Box<dyn DomNode>>> {
        let ids: Vec<NodeId> = {
            let state = self.state.lock().unwrap();
            let mut ids = state.pages[state.current]
                .get(selector)
                .cloned()
                .unwrap_or_default();
            if let Some(global) = state.global.get(selector) {
                ids.extend(global.iter().copied());
            }
            ids
        };
        Ok(ids.into_iter().map(|id| self.handle(id)).collect())
    }

    async fn wait_for(&self, selector: &str, _timeout_ms: u64) -> Result<bool> {
        Ok(!self.query(selector).await?.is_empty())
    }

    async fn execute_js(&self, script: &str) -> Result<serde_json::Value> {
        // The only page-level script with a return value is the bulk
        // filter clear; everything else (scroll, key dispatch) is a no-op.
        if script.contains("checkbox") && script.contains("click") {
            let mut state = self.state.lock().unwrap();
            let checked: Vec<NodeId> = state
                .nodes
                .iter()
                .enumerate()
                .filter(|(_, n)| {
                    n.spec.checked
                        && n.spec
                            .attrs
                            .iter()
                            .any(|(k, v)| k == "type" && v == "checkbox")
                })
                .map(|(id, _)| id)
                .collect();
            for id in &checked {
                apply_click(&mut state, *id);
            }
            return Ok(serde_json::Value::from(checked.len() as u64));
        }
        Ok(serde_json::Value::Null)
    }

    async fn scroll_to_bottom(&self) -> Result<()> {
        self.state.lock().unwrap().scrolls += 1;
        Ok(())
    }

    async fn press_escape(&self) -> Result<()> {
        self.state.lock().unwrap().escapes += 1;
        Ok(())
    }

    async fn url(&self) -> Result<String> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .navigations
            .last()
            .cloned()
            .unwrap_or_else(|| "about:blank".to_string()))
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.state.lock().unwrap().closes += 1;
        Ok(())
    }
}

/// Handle to one scripted node.
pub struct MockNode {
    id: NodeId,
    state: Arc<Mutex<DomState>>,
}

#[async_trait]
impl DomNode for MockNode {
    async fn query(&self, selector: &str) -> Result<Vec<Box<dyn DomNode>>> {
        let ids: Vec<NodeId> = {
            let state = self.state.lock().unwrap();
            state.nodes[self.id]
                .children
                .get(selector)
                .cloned()
                .unwrap_or_default()
        };
        Ok(ids
            .into_iter()
            .map(|id| {
                Box::new(MockNode {
                    id,
                    state: Arc::clone(&self.state),
                }) as Box<dyn DomNode>
            })
            .collect())
    }

    async fn text(&self) -> Result<String> {
        Ok(self.state.lock().unwrap().nodes[self.id]
            .spec
            .text
            .trim()
            .to_string())
    }

    async fn parent_text(&self) -> Result<String> {
        let state = self.state.lock().unwrap();
        match state.nodes[self.id].parent {
            Some(parent) => Ok(state.nodes[parent].spec.text.trim().to_string()),
            None => Ok(String::new()),
        }
    }

    async fn attribute(&self, name: &str) -> Result<Option<String>> {
        Ok(self.state.lock().unwrap().nodes[self.id]
            .spec
            .attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.clone()))
    }

    async fn click(&self) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.nodes[self.id].spec.direct_click_fails {
            bail!("click intercepted");
        }
        apply_click(&mut state, self.id);
        Ok(())
    }

    async fn click_via_js(&self) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        apply_click(&mut state, self.id);
        Ok(())
    }

    async fn scroll_into_view(&self) -> Result<()> {
        Ok(())
    }

    async fn is_checked(&self) -> Result<bool> {
        Ok(self.state.lock().unwrap().nodes[self.id].spec.checked)
    }

    async fn is_enabled(&self) -> Result<bool> {
        Ok(self.state.lock().unwrap().nodes[self.id].spec.enabled)
    }

    async fn is_visible(&self) -> Result<bool> {
        Ok(self.state.lock().unwrap().nodes[self.id].spec.visible)
    }

    async fn hide(&self) -> Result<()> {
        self.state.lock().unwrap().nodes[self.id].spec.visible = false;
        Ok(())
    }
}

/// A renderer handing out clones of one scripted page.
pub struct MockRenderer {
    page: MockPage,
    fail_new_page: bool,
}

impl MockRenderer {
    pub fn new(page: MockPage) -> Self {
        Self {
            page,
            fail_new_page: false,
        }
    }

    /// A renderer whose `new_page` always fails (launch-failure path).
    pub fn broken() -> Self {
        Self {
            page: MockPage::new(),
            fail_new_page: true,
        }
    }
}

#[async_trait]
impl Renderer for MockRenderer {
    async fn new_page(&self) -> Result<Box<dyn PageContext>> {
        if self.fail_new_page {
            bail!("no browser");
        }
        Ok(Box::new(self.page.clone()))
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    fn active_pages(&self) -> usize {
        0
    }
}

/// Ready-made DOM structures matching the selector chains the pipeline
/// queries.
pub mod fixtures {
    use super::*;
    use crate::scrape::selectors as sel;

    pub struct ArticleIds {
        pub article: NodeId,
        pub text_node: NodeId,
    }

    /// One complete review article on `page_idx`.
    pub fn review_article(
        dom: &MockPage,
        page_idx: usize,
        name: &str,
        text: &str,
        rating: u8,
    ) -> ArticleIds {
        let article = dom.add_node(NodeSpec::new());
        dom.place(page_idx, sel::REVIEW_CONTAINERS[0], article);

        let star = dom.add_node(NodeSpec::new().attr("aria-label", &format!("bintang {rating}")));
        dom.attach(article, sel::STAR_RATING, star);

        let name_node = dom.add_node(NodeSpec::new().text(name));
        dom.attach(article, sel::REVIEWER_NAME[0], name_node);

        let text_node = dom.add_node(NodeSpec::new().text(text));
        dom.attach(article, sel::REVIEW_TEXT[0], text_node);

        let date_node = dom.add_node(NodeSpec::new().text("9 bulan lalu"));
        dom.attach(article, sel::REVIEW_DATE[0], date_node);

        let variant_node = dom.add_node(NodeSpec::new().text("Varian: Space Grey"));
        dom.attach(article, sel::VARIANT[0], variant_node);

        ArticleIds { article, text_node }
    }

    /// The sidebar rating-filter panel: five entries rendered 5→1, each a
    /// container answering both detection strategies, holding a toggling
    /// checkbox and a numeric label. Returns rating → checkbox id.
    pub fn filter_panel(dom: &MockPage, pre_checked: &[u8]) -> HashMap<u8, NodeId> {
        let mut checkboxes = HashMap::new();
        for rating in (1..=5u8).rev() {
            let container = dom.add_node(NodeSpec::new());
            dom.place_global(sel::RATING_FILTER_CONTAINERS, container);
            dom.place_global(sel::FILTER_LABELS, container);

            let checkbox = dom.add_node(
                NodeSpec::new()
                    .attr("type", "checkbox")
                    .checked(pre_checked.contains(&rating))
                    .effect(ClickEffect::ToggleChecked),
            );
            dom.attach(container, sel::CHECKBOX, checkbox);

            let label = dom.add_node(NodeSpec::new().text(&rating.to_string()));
            dom.attach(container, sel::LABEL_TEXTS, label);

            checkboxes.insert(rating, checkbox);
        }
        checkboxes
    }

    /// An enabled, visible next-page button on `page_idx`.
    pub fn next_button(dom: &MockPage, page_idx: usize) -> NodeId {
        let button = dom.add_node(NodeSpec::new().effect(ClickEffect::NextPage));
        dom.place(page_idx, sel::NEXT_PAGE[0], button);
        button
    }
}
