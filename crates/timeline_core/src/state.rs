use crate::view_model::{AppViewModel, ItemRowView, WORD_CLOUD_SIZE};
use crate::{top_words, CollectedItem, CompletionReason, DEFAULT_PACING_MS, DEFAULT_TARGET_COUNT};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Collecting,
    Finished,
}

/// Everything one panel session knows. Owned by the caller and only changed
/// through [`crate::update`].
#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    session: SessionState,
    target_input: String,
    pacing_input: String,
    progress: f64,
    items: Vec<CollectedItem>,
    last_reason: Option<CompletionReason>,
    notice: Option<String>,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            session: SessionState::Idle,
            target_input: DEFAULT_TARGET_COUNT.to_string(),
            pacing_input: DEFAULT_PACING_MS.to_string(),
            progress: 0.0,
            items: Vec::new(),
            last_reason: None,
            notice: None,
            dirty: false,
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> SessionState {
        self.session
    }

    pub fn items(&self) -> &[CollectedItem] {
        &self.items
    }

    pub fn view(&self) -> AppViewModel {
        let rows = self
            .items
            .iter()
            .map(|item| ItemRowView {
                text: item.text.clone(),
                display_time: item.timestamp_display.clone(),
            })
            .collect();
        let word_cloud = if self.session == SessionState::Finished {
            top_words(self.items.iter().map(|i| i.text.as_str()), WORD_CLOUD_SIZE)
        } else {
            Vec::new()
        };
        AppViewModel {
            session: self.session,
            target_input: self.target_input.clone(),
            pacing_input: self.pacing_input.clone(),
            progress_percent: (self.progress * 100.0).round().clamp(0.0, 100.0) as u8,
            start_enabled: self.session != SessionState::Collecting,
            export_enabled: self.session == SessionState::Finished && !self.items.is_empty(),
            rows,
            word_cloud,
            last_reason: self.last_reason,
            notice: self.notice.clone(),
            dirty: self.dirty,
        }
    }

    /// Returns whether anything changed since the last call, and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn inputs(&self) -> (&str, &str) {
        (&self.target_input, &self.pacing_input)
    }

    pub(crate) fn set_target_input(&mut self, value: String) {
        if self.target_input != value {
            self.target_input = value;
            self.dirty = true;
        }
    }

    pub(crate) fn set_pacing_input(&mut self, value: String) {
        if self.pacing_input != value {
            self.pacing_input = value;
            self.dirty = true;
        }
    }

    /// Previous results are discarded when a new run starts.
    pub(crate) fn start_collecting(&mut self) {
        self.session = SessionState::Collecting;
        self.items.clear();
        self.progress = 0.0;
        self.last_reason = None;
        self.notice = None;
        self.dirty = true;
    }

    pub(crate) fn apply_progress(&mut self, fraction: f64) {
        let fraction = fraction.clamp(0.0, 1.0);
        if (fraction - self.progress).abs() > f64::EPSILON {
            self.progress = fraction;
            self.dirty = true;
        }
    }

    pub(crate) fn finish(&mut self, items: Vec<CollectedItem>, reason: CompletionReason) {
        self.session = SessionState::Finished;
        self.items = items;
        self.last_reason = Some(reason);
        self.dirty = true;
    }

    pub(crate) fn set_notice(&mut self, notice: impl Into<String>) {
        self.notice = Some(notice.into());
        self.dirty = true;
    }
}
