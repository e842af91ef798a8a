//! Capabilities the hosting environment lends to the collector.
//!
//! The document is live and owned by someone else: any handle may go stale
//! between two calls, and every call may fail.
use std::fmt;

/// Opaque reference to one element of the hosted document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementHandle(pub u64);

impl fmt::Display for ElementHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    #[error("element {0} is no longer attached to the document")]
    StaleElement(ElementHandle),
    #[error("invalid selector {selector:?}: {message}")]
    InvalidSelector { selector: String, message: String },
    #[error("no previous page in history")]
    NoHistory,
    #[error("host script failed: {0}")]
    Script(String),
    #[error("browser unavailable: {0}")]
    Unavailable(String),
}

#[async_trait::async_trait]
pub trait DocumentQuery: Send + Sync {
    async fn find_all(&self, selector: &str) -> Result<Vec<ElementHandle>, HostError>;

    async fn find_first(&self, selector: &str) -> Result<Option<ElementHandle>, HostError>;

    async fn find_first_within(
        &self,
        scope: ElementHandle,
        selector: &str,
    ) -> Result<Option<ElementHandle>, HostError>;

    /// Rendered text of the element and its subtree.
    async fn inner_text(&self, element: ElementHandle) -> Result<String, HostError>;

    async fn attribute(
        &self,
        element: ElementHandle,
        name: &str,
    ) -> Result<Option<String>, HostError>;

    /// Text content of every descendant element, in document order.
    async fn descendant_texts(&self, element: ElementHandle) -> Result<Vec<String>, HostError>;
}

#[async_trait::async_trait]
pub trait Viewport: Send + Sync {
    async fn scroll_offset(&self) -> Result<f64, HostError>;

    async fn scroll_to(&self, offset: f64) -> Result<(), HostError>;

    /// Distance from the top of the viewport to the top of the element.
    async fn element_top(&self, element: ElementHandle) -> Result<f64, HostError>;

    /// Resolves on the next display refresh.
    async fn next_frame(&self) -> Result<(), HostError>;
}

#[async_trait::async_trait]
pub trait Navigation: Send + Sync {
    async fn location(&self) -> Result<String, HostError>;

    /// Simulated click.
    async fn activate(&self, element: ElementHandle) -> Result<(), HostError>;

    async fn go_back(&self) -> Result<(), HostError>;
}

/// Everything the collector needs from its environment.
pub trait Host: DocumentQuery + Viewport + Navigation {}

impl<T: DocumentQuery + Viewport + Navigation + ?Sized> Host for T {}
