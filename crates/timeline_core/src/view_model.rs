use crate::{CompletionReason, SessionState, WordCount};

/// Number of words shown in the word cloud.
pub const WORD_CLOUD_SIZE: usize = 30;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub session: SessionState,
    pub target_input: String,
    pub pacing_input: String,
    pub progress_percent: u8,
    pub start_enabled: bool,
    pub export_enabled: bool,
    pub rows: Vec<ItemRowView>,
    pub word_cloud: Vec<WordCount>,
    pub last_reason: Option<CompletionReason>,
    pub notice: Option<String>,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRowView {
    pub text: String,
    pub display_time: String,
}
