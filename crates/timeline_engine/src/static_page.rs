//! Offline host over saved HTML pages.
//!
//! The current page is re-parsed on every query; handles stay valid as long
//! as the page they came from is the current one. Layout is approximated:
//! every element is one row of fixed height, in document order.
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use ego_tree::NodeId;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::host::{DocumentQuery, ElementHandle, HostError, Navigation, Viewport};

const ROW_HEIGHT: f64 = 40.0;

pub struct StaticPage {
    state: Mutex<PageState>,
}

struct PageState {
    pages: HashMap<String, String>,
    history: Vec<String>,
    handles: Vec<(String, NodeId)>,
    handle_ids: HashMap<(String, NodeId), u64>,
    offset: f64,
}

impl StaticPage {
    pub fn new(url: impl Into<String>, html: impl Into<String>) -> Self {
        let url = url.into();
        let mut pages = HashMap::new();
        pages.insert(url.clone(), html.into());
        Self {
            state: Mutex::new(PageState {
                pages,
                history: vec![url],
                handles: Vec::new(),
                handle_ids: HashMap::new(),
                offset: 0.0,
            }),
        }
    }

    /// Registers a page that activation may navigate to.
    pub fn with_page(self, url: impl Into<String>, html: impl Into<String>) -> Self {
        if let Ok(mut state) = self.state.lock() {
            state.pages.insert(url.into(), html.into());
        }
        self
    }

    pub fn from_file(path: &Path) -> std::io::Result<Self> {
        let html = std::fs::read_to_string(path)?;
        Ok(Self::new(file_url(path)?, html))
    }

    /// Registers a saved page under its own `file://` URL, so relative links
    /// between files saved side by side resolve.
    pub fn with_file(self, path: &Path) -> std::io::Result<Self> {
        let html = std::fs::read_to_string(path)?;
        Ok(self.with_page(file_url(path)?, html))
    }

    fn lock(&self) -> Result<MutexGuard<'_, PageState>, HostError> {
        self.state
            .lock()
            .map_err(|_| HostError::Unavailable("page state poisoned".into()))
    }

    fn with_element<T>(
        &self,
        handle: ElementHandle,
        f: impl FnOnce(ElementRef<'_>) -> T,
    ) -> Result<T, HostError> {
        let state = self.lock()?;
        let node_id = state.resolve(handle)?;
        let document = state.document();
        let element = document
            .tree
            .get(node_id)
            .and_then(ElementRef::wrap)
            .ok_or(HostError::StaleElement(handle))?;
        Ok(f(element))
    }
}

impl PageState {
    fn current(&self) -> &str {
        self.history.last().map(String::as_str).unwrap_or_default()
    }

    fn document(&self) -> Html {
        let html = self.pages.get(self.current()).map(String::as_str);
        Html::parse_document(html.unwrap_or_default())
    }

    fn handle_for(&mut self, node: NodeId) -> ElementHandle {
        let key = (self.current().to_string(), node);
        if let Some(id) = self.handle_ids.get(&key) {
            return ElementHandle(*id);
        }
        let id = self.handles.len() as u64;
        self.handles.push(key.clone());
        self.handle_ids.insert(key, id);
        ElementHandle(id)
    }

    fn resolve(&self, handle: ElementHandle) -> Result<NodeId, HostError> {
        match self.handles.get(handle.0 as usize) {
            Some((page, node)) if page == self.current() => Ok(*node),
            _ => Err(HostError::StaleElement(handle)),
        }
    }

    fn resolve_link(&self, href: &str) -> Option<String> {
        if self.pages.contains_key(href) {
            return Some(href.to_string());
        }
        let joined = Url::parse(self.current()).ok()?.join(href).ok()?;
        let joined = String::from(joined);
        self.pages.contains_key(&joined).then_some(joined)
    }
}

fn file_url(path: &Path) -> std::io::Result<String> {
    let absolute = std::fs::canonicalize(path)?;
    Ok(Url::from_file_path(&absolute)
        .map(String::from)
        .unwrap_or_else(|_| format!("file://{}", absolute.display())))
}

fn parse_selector(selector: &str) -> Result<Selector, HostError> {
    Selector::parse(selector).map_err(|err| HostError::InvalidSelector {
        selector: selector.to_string(),
        message: format!("{err:?}"),
    })
}

fn rendered_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn element_ids(document: &Html) -> Vec<NodeId> {
    document
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .map(|element| element.id())
        .collect()
}

/// Link targets an activation of `element` could follow, nearest first.
fn link_targets(element: ElementRef<'_>) -> Vec<String> {
    let mut targets = Vec::new();
    let own_and_ancestors = std::iter::once(element)
        .chain(element.ancestors().filter_map(ElementRef::wrap));
    for candidate in own_and_ancestors {
        for attr in ["href", "data-href"] {
            if let Some(value) = candidate.value().attr(attr) {
                targets.push(value.trim().to_string());
            }
        }
    }
    if let Ok(anchor) = Selector::parse("a[href]") {
        for link in element.select(&anchor) {
            if let Some(href) = link.value().attr("href") {
                targets.push(href.trim().to_string());
            }
        }
    }
    targets
}

#[async_trait::async_trait]
impl DocumentQuery for StaticPage {
    async fn find_all(&self, selector: &str) -> Result<Vec<ElementHandle>, HostError> {
        let selector = parse_selector(selector)?;
        let mut state = self.lock()?;
        let ids: Vec<NodeId> = state
            .document()
            .select(&selector)
            .map(|element| element.id())
            .collect();
        Ok(ids.into_iter().map(|id| state.handle_for(id)).collect())
    }

    async fn find_first(&self, selector: &str) -> Result<Option<ElementHandle>, HostError> {
        let selector = parse_selector(selector)?;
        let mut state = self.lock()?;
        let id = state.document().select(&selector).next().map(|e| e.id());
        Ok(id.map(|id| state.handle_for(id)))
    }

    async fn find_first_within(
        &self,
        scope: ElementHandle,
        selector: &str,
    ) -> Result<Option<ElementHandle>, HostError> {
        let selector = parse_selector(selector)?;
        let found = self.with_element(scope, |element| {
            element
                .select(&selector)
                .map(|e| e.id())
                .find(|id| *id != element.id())
        })?;
        let mut state = self.lock()?;
        Ok(found.map(|id| state.handle_for(id)))
    }

    async fn inner_text(&self, element: ElementHandle) -> Result<String, HostError> {
        self.with_element(element, rendered_text)
    }

    async fn attribute(
        &self,
        element: ElementHandle,
        name: &str,
    ) -> Result<Option<String>, HostError> {
        self.with_element(element, |e| e.value().attr(name).map(str::to_string))
    }

    async fn descendant_texts(&self, element: ElementHandle) -> Result<Vec<String>, HostError> {
        self.with_element(element, |e| {
            e.descendants()
                .skip(1)
                .filter_map(ElementRef::wrap)
                .map(|child| child.text().collect::<String>())
                .collect()
        })
    }
}

#[async_trait::async_trait]
impl Viewport for StaticPage {
    async fn scroll_offset(&self) -> Result<f64, HostError> {
        Ok(self.lock()?.offset)
    }

    async fn scroll_to(&self, offset: f64) -> Result<(), HostError> {
        let mut state = self.lock()?;
        let max = element_ids(&state.document()).len() as f64 * ROW_HEIGHT;
        state.offset = offset.clamp(0.0, max);
        Ok(())
    }

    async fn element_top(&self, element: ElementHandle) -> Result<f64, HostError> {
        let state = self.lock()?;
        let node_id = state.resolve(element)?;
        let row = element_ids(&state.document())
            .iter()
            .position(|id| *id == node_id)
            .ok_or(HostError::StaleElement(element))?;
        Ok(row as f64 * ROW_HEIGHT - state.offset)
    }

    async fn next_frame(&self) -> Result<(), HostError> {
        tokio::task::yield_now().await;
        Ok(())
    }
}

#[async_trait::async_trait]
impl Navigation for StaticPage {
    async fn location(&self) -> Result<String, HostError> {
        Ok(self.lock()?.current().to_string())
    }

    async fn activate(&self, element: ElementHandle) -> Result<(), HostError> {
        let targets = self.with_element(element, link_targets)?;
        let mut state = self.lock()?;
        if let Some(next) = targets.iter().find_map(|href| state.resolve_link(href)) {
            state.history.push(next);
            state.offset = 0.0;
        }
        Ok(())
    }

    async fn go_back(&self) -> Result<(), HostError> {
        let mut state = self.lock()?;
        if state.history.len() < 2 {
            return Err(HostError::NoHistory);
        }
        state.history.pop();
        Ok(())
    }
}
