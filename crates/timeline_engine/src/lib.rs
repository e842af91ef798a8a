//! Timeline engine: host capabilities, extraction step and collector loop.
#[cfg(feature = "browser")]
mod browser;
mod collector;
mod engine;
mod export;
mod extract;
mod fingerprint;
mod host;
mod persist;
mod scroll;
mod settings;
mod static_page;
mod wait;

#[cfg(feature = "browser")]
pub use browser::BrowserHost;
pub use collector::{Collector, CollectorEvent, NullSink, ProgressSink};
pub use engine::{ChannelProgressSink, CollectorHandle, EngineEvent};
pub use export::{write_csv_export, ExportError};
pub use extract::{join_fragments, Extractor};
pub use fingerprint::{ContentHashFingerprint, Fingerprint, Fingerprinter, PrefixFingerprint};
pub use host::{DocumentQuery, ElementHandle, Host, HostError, Navigation, Viewport};
pub use persist::{ExportDir, PersistError};
pub use scroll::{scroll_into_view, smooth_scroll, StepError};
pub use settings::{CollectorSettings, Selectors};
pub use static_page::StaticPage;
pub use wait::{pause, Cancelled, FixedDelay, PollForElement, Settle, WaitPolicy};
