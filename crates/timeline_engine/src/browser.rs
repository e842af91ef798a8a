//! Live host driving a Chromium tab over CDP.
//!
//! Element handles are ids in a registry kept on `window`, so they survive
//! between calls as long as the page itself is not reloaded. Entries for
//! detached elements are dropped on every `find_all`.
use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
use chromiumoxide::{Browser, BrowserConfig, Page};
use engine_logging::engine_info;
use futures_util::StreamExt;
use serde::de::DeserializeOwned;

use crate::host::{DocumentQuery, ElementHandle, HostError, Navigation, Viewport};

const REGISTRY: &str = "const r = (window.__timelineHandles = window.__timelineHandles || \
{ next: 0, byId: new Map(), ids: new WeakMap() }); \
const id = (e) => { let i = r.ids.get(e); if (i === undefined) { i = r.next++; r.ids.set(e, i); r.byId.set(i, e); } return i; }; \
const el = (h) => { const e = r.byId.get(h); if (!e || !e.isConnected) { throw new Error('stale element ' + h); } return e; }; \
const prune = () => { for (const [i, e] of r.byId) { if (!e.isConnected) { r.byId.delete(i); r.ids.delete(e); } } };";

const NEXT_FRAME: &str = "new Promise(resolve => requestAnimationFrame(() => resolve(true)))";

pub struct BrowserHost {
    _browser: Browser,
    page: Page,
    handler: tokio::task::JoinHandle<()>,
}

impl BrowserHost {
    /// Launches Chromium and opens `url`. Must be called inside a
    /// multi-threaded tokio runtime that outlives the host.
    pub async fn launch(url: &str, headless: bool) -> Result<Self, HostError> {
        let builder = BrowserConfig::builder();
        let builder = if headless { builder } else { builder.with_head() };
        let config = builder.viewport(None).build().map_err(HostError::Unavailable)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| HostError::Unavailable(e.to_string()))?;
        let handler = tokio::spawn(async move {
            while let Some(_event) = handler.next().await {}
        });

        let page = browser
            .new_page(url)
            .await
            .map_err(|e| HostError::Unavailable(e.to_string()))?;
        engine_info!("Opened {} in Chromium", url);

        Ok(Self {
            _browser: browser,
            page,
            handler,
        })
    }

    async fn eval<T: DeserializeOwned>(&self, body: &str) -> Result<T, HostError> {
        let script = format!("(() => {{ {REGISTRY} {body} }})()");
        self.page
            .evaluate(script.as_str())
            .await
            .map_err(|e| HostError::Script(e.to_string()))?
            .into_value::<T>()
            .map_err(|e| HostError::Script(e.to_string()))
    }
}

impl Drop for BrowserHost {
    fn drop(&mut self) {
        self.handler.abort();
    }
}

fn js_string(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "\"\"".to_string())
}

#[async_trait::async_trait]
impl DocumentQuery for BrowserHost {
    async fn find_all(&self, selector: &str) -> Result<Vec<ElementHandle>, HostError> {
        let body = format!(
            "prune(); return Array.from(document.querySelectorAll({})).map(id);",
            js_string(selector)
        );
        let ids: Vec<u64> = self.eval(&body).await?;
        Ok(ids.into_iter().map(ElementHandle).collect())
    }

    async fn find_first(&self, selector: &str) -> Result<Option<ElementHandle>, HostError> {
        let body = format!(
            "const e = document.querySelector({}); return e ? id(e) : null;",
            js_string(selector)
        );
        let found: Option<u64> = self.eval(&body).await?;
        Ok(found.map(ElementHandle))
    }

    async fn find_first_within(
        &self,
        scope: ElementHandle,
        selector: &str,
    ) -> Result<Option<ElementHandle>, HostError> {
        let body = format!(
            "const e = el({}).querySelector({}); return e ? id(e) : null;",
            scope.0,
            js_string(selector)
        );
        let found: Option<u64> = self.eval(&body).await?;
        Ok(found.map(ElementHandle))
    }

    async fn inner_text(&self, element: ElementHandle) -> Result<String, HostError> {
        self.eval(&format!("return el({}).innerText;", element.0))
            .await
    }

    async fn attribute(
        &self,
        element: ElementHandle,
        name: &str,
    ) -> Result<Option<String>, HostError> {
        let body = format!("return el({}).getAttribute({});", element.0, js_string(name));
        self.eval(&body).await
    }

    async fn descendant_texts(&self, element: ElementHandle) -> Result<Vec<String>, HostError> {
        let body = format!(
            "return Array.from(el({}).querySelectorAll('*')).map(n => n.textContent || '');",
            element.0
        );
        self.eval(&body).await
    }
}

#[async_trait::async_trait]
impl Viewport for BrowserHost {
    async fn scroll_offset(&self) -> Result<f64, HostError> {
        self.eval("return window.scrollY;").await
    }

    async fn scroll_to(&self, offset: f64) -> Result<(), HostError> {
        let _: bool = self
            .eval(&format!("window.scrollTo(0, {offset}); return true;"))
            .await?;
        Ok(())
    }

    async fn element_top(&self, element: ElementHandle) -> Result<f64, HostError> {
        self.eval(&format!(
            "return el({}).getBoundingClientRect().top;",
            element.0
        ))
        .await
    }

    async fn next_frame(&self) -> Result<(), HostError> {
        let params = EvaluateParams::builder()
            .expression(NEXT_FRAME)
            .await_promise(true)
            .build()
            .map_err(HostError::Script)?;
        let _: bool = self
            .page
            .evaluate(params)
            .await
            .map_err(|e| HostError::Script(e.to_string()))?
            .into_value()
            .map_err(|e| HostError::Script(e.to_string()))?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl Navigation for BrowserHost {
    async fn location(&self) -> Result<String, HostError> {
        self.eval("return window.location.href;").await
    }

    async fn activate(&self, element: ElementHandle) -> Result<(), HostError> {
        let _: bool = self
            .eval(&format!("el({}).click(); return true;", element.0))
            .await?;
        Ok(())
    }

    async fn go_back(&self) -> Result<(), HostError> {
        let _: bool = self.eval("window.history.back(); return true;").await?;
        Ok(())
    }
}
