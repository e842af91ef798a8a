use crate::{CollectedItem, CompletionReason};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// User edited the target count field.
    TargetCountChanged(String),
    /// User edited the pacing field (milliseconds).
    PacingChanged(String),
    /// User clicked Start.
    StartClicked,
    /// User asked to stop the running collection.
    StopClicked,
    /// Collector progress, as a fraction in `0.0..=1.0`.
    Progress(f64),
    /// Collector finished; carries everything gathered so far.
    CollectionFinished {
        items: Vec<CollectedItem>,
        reason: CompletionReason,
    },
    /// User clicked Export CSV.
    ExportCsvClicked,
    /// User clicked Copy.
    CopyClicked,
    /// User asked for the summarizer hand-off text.
    SummarizeClicked,
    /// An export effect completed; the string is shown to the user.
    ExportSucceeded(String),
    /// An export effect failed; the string is shown to the user.
    ExportFailed(String),
    /// A blank input line.
    NoOp,
}
