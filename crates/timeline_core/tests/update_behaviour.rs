use std::sync::Once;
use std::time::Duration;

use pretty_assertions::assert_eq;
use timeline_core::{
    update, AppState, CollectedItem, CollectionRequest, CompletionReason, Effect, Msg,
    SessionState,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

fn item(text: &str, index: usize) -> CollectedItem {
    CollectedItem {
        text: text.to_string(),
        timestamp_raw: "2024-05-01T10:00:00.000Z".to_string(),
        timestamp_display: "01/05/2024 10:00:00".to_string(),
        sequence_index: index,
    }
}

fn start(state: AppState, target: &str, pacing: &str) -> (AppState, Vec<Effect>) {
    let (state, _) = update(state, Msg::TargetCountChanged(target.to_string()));
    let (state, _) = update(state, Msg::PacingChanged(pacing.to_string()));
    update(state, Msg::StartClicked)
}

fn finished_with(items: Vec<CollectedItem>) -> AppState {
    let (state, _) = start(AppState::new(), "2", "500");
    let (state, _) = update(
        state,
        Msg::CollectionFinished {
            items,
            reason: CompletionReason::TargetReached,
        },
    );
    state
}

#[test]
fn start_emits_validated_request() {
    init_logging();
    let (mut state, effects) = start(AppState::new(), " 3 ", "250");

    assert_eq!(state.session(), SessionState::Collecting);
    assert_eq!(
        effects,
        vec![Effect::StartCollection(
            CollectionRequest::new(3, Duration::from_millis(250)).unwrap()
        )]
    );
    let view = state.view();
    assert!(!view.start_enabled);
    assert!(!view.export_enabled);
    assert!(state.consume_dirty());
}

#[test]
fn invalid_target_sets_notice_without_effect() {
    init_logging();
    let (state, effects) = start(AppState::new(), "0", "500");

    assert!(effects.is_empty());
    assert_eq!(state.session(), SessionState::Idle);
    assert_eq!(
        state.view().notice.as_deref(),
        Some("target count must be at least 1")
    );
}

#[test]
fn second_start_while_collecting_is_ignored() {
    init_logging();
    let (mut state, _) = start(AppState::new(), "5", "500");
    assert!(state.consume_dirty());

    let (mut state, effects) = update(state, Msg::StartClicked);
    assert!(effects.is_empty());
    assert!(!state.consume_dirty());
}

#[test]
fn progress_is_reported_as_rounded_percent() {
    init_logging();
    let (state, _) = start(AppState::new(), "3", "500");
    let (state, _) = update(state, Msg::Progress(1.0 / 3.0));
    assert_eq!(state.view().progress_percent, 33);
    let (state, _) = update(state, Msg::Progress(2.0 / 3.0));
    assert_eq!(state.view().progress_percent, 67);
}

#[test]
fn finishing_enables_export_and_word_cloud() {
    init_logging();
    let state = finished_with(vec![
        item("Journée ensoleillée sur Paris", 0),
        item("Paris sous la pluie", 2),
    ]);
    let view = state.view();

    assert_eq!(view.session, SessionState::Finished);
    assert!(view.export_enabled);
    assert!(view.start_enabled);
    assert_eq!(view.rows.len(), 2);
    assert_eq!(view.rows[1].display_time, "01/05/2024 10:00:00");
    assert_eq!(view.word_cloud[0].word, "paris");
    assert_eq!(view.word_cloud[0].count, 2);
    assert_eq!(view.last_reason, Some(CompletionReason::TargetReached));
}

#[test]
fn export_requires_items() {
    init_logging();
    let state = finished_with(Vec::new());
    assert!(!state.view().export_enabled);

    let (state, effects) = update(state, Msg::ExportCsvClicked);
    assert!(effects.is_empty());
    let (_, effects) = update(state, Msg::CopyClicked);
    assert!(effects.is_empty());
}

#[test]
fn export_and_copy_carry_collected_items() {
    init_logging();
    let items = vec![item("un", 0), item("deux", 1)];
    let state = finished_with(items.clone());

    let (state, effects) = update(state, Msg::ExportCsvClicked);
    assert_eq!(
        effects,
        vec![Effect::WriteCsv {
            items: items.clone()
        }]
    );
    let (state, effects) = update(state, Msg::CopyClicked);
    assert_eq!(effects, vec![Effect::CopyToClipboard { items }]);
    let (_, effects) = update(state, Msg::SummarizeClicked);
    assert!(matches!(
        effects.as_slice(),
        [Effect::HandOffToSummarizer { prompt }] if prompt.contains("] deux\n")
    ));
}

#[test]
fn export_failure_keeps_items() {
    init_logging();
    let state = finished_with(vec![item("garde moi", 0)]);
    let (state, _) = update(state, Msg::ExportFailed("disk full".to_string()));

    let view = state.view();
    assert_eq!(view.notice.as_deref(), Some("disk full"));
    assert_eq!(view.rows.len(), 1);
    assert!(view.export_enabled);
}

#[test]
fn stop_only_cancels_running_collection() {
    init_logging();
    let (_, effects) = update(AppState::new(), Msg::StopClicked);
    assert!(effects.is_empty());

    let (state, _) = start(AppState::new(), "4", "500");
    let (_, effects) = update(state, Msg::StopClicked);
    assert_eq!(effects, vec![Effect::CancelCollection]);
}

#[test]
fn restart_discards_previous_results() {
    init_logging();
    let state = finished_with(vec![item("ancien", 0)]);
    let (state, effects) = update(state, Msg::StartClicked);

    assert_eq!(effects.len(), 1);
    let view = state.view();
    assert!(view.rows.is_empty());
    assert_eq!(view.progress_percent, 0);
    assert_eq!(view.last_reason, None);
}
