//! Timeline core: data model, pure session state machine and export helpers.
mod effect;
mod export;
mod item;
mod msg;
mod state;
mod time_format;
mod update;
mod view_model;
mod words;

pub use effect::Effect;
pub use export::{
    build_csv, clipboard_text, csv_filename, summarization_prompt, CSV_BOM, CSV_HEADERS,
};
pub use item::{
    CollectedItem, CollectionRequest, CollectionResult, CompletionReason, RequestError,
    DEFAULT_PACING_MS, DEFAULT_TARGET_COUNT,
};
pub use msg::Msg;
pub use state::{AppState, SessionState};
pub use time_format::{format_display_time, format_extraction_date, DisplayZone};
pub use update::update;
pub use view_model::{AppViewModel, ItemRowView, WORD_CLOUD_SIZE};
pub use words::{top_words, word_frequencies, WordCount, EXCLUDED_WORDS};
