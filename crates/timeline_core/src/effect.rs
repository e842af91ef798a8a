use crate::{CollectedItem, CollectionRequest};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    StartCollection(CollectionRequest),
    CancelCollection,
    WriteCsv { items: Vec<CollectedItem> },
    CopyToClipboard { items: Vec<CollectedItem> },
    HandOffToSummarizer { prompt: String },
}
