use crate::{summarization_prompt, AppState, CollectionRequest, Effect, Msg, SessionState};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::TargetCountChanged(value) => {
            state.set_target_input(value);
            Vec::new()
        }
        Msg::PacingChanged(value) => {
            state.set_pacing_input(value);
            Vec::new()
        }
        Msg::StartClicked => {
            // A second click while a run is in flight is ignored.
            if state.session() == SessionState::Collecting {
                return (state, Vec::new());
            }
            let (target, pacing) = state.inputs();
            match CollectionRequest::parse(target, pacing) {
                Ok(request) => {
                    state.start_collecting();
                    vec![Effect::StartCollection(request)]
                }
                Err(err) => {
                    state.set_notice(err.to_string());
                    Vec::new()
                }
            }
        }
        Msg::StopClicked => {
            if state.session() == SessionState::Collecting {
                vec![Effect::CancelCollection]
            } else {
                Vec::new()
            }
        }
        Msg::Progress(fraction) => {
            if state.session() == SessionState::Collecting {
                state.apply_progress(fraction);
            }
            Vec::new()
        }
        Msg::CollectionFinished { items, reason } => {
            if state.session() == SessionState::Collecting {
                state.finish(items, reason);
            }
            Vec::new()
        }
        Msg::ExportCsvClicked => match exportable_items(&state) {
            Some(items) => vec![Effect::WriteCsv { items }],
            None => Vec::new(),
        },
        Msg::CopyClicked => match exportable_items(&state) {
            Some(items) => vec![Effect::CopyToClipboard { items }],
            None => Vec::new(),
        },
        Msg::SummarizeClicked => match exportable_items(&state) {
            Some(items) => vec![Effect::HandOffToSummarizer {
                prompt: summarization_prompt(&items),
            }],
            None => Vec::new(),
        },
        Msg::ExportSucceeded(notice) | Msg::ExportFailed(notice) => {
            state.set_notice(notice);
            Vec::new()
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn exportable_items(state: &AppState) -> Option<Vec<crate::CollectedItem>> {
    if state.session() == SessionState::Finished && !state.items().is_empty() {
        Some(state.items().to_vec())
    } else {
        None
    }
}
