use std::sync::Arc;

use super::*;
use player_core::ScreenDependencies;
use storage::{InMemoryPreferenceStore, WriteCounts};

const SCRIPT: &str = include_str!("../../scripts/numeric_lesson.json");

#[test]
fn parses_every_step_kind() {
    let script = parse_script(SCRIPT).expect("script");
    assert_eq!(
        script.initial_preference,
        Some(PreferenceSnapshot::default())
    );
    assert_eq!(script.steps.len(), 8);
    assert_eq!(script.steps[2], ScriptStep::AudioClick);
    assert_eq!(script.steps[3], ScriptStep::ConfirmDialog { persist: true });
    assert!(matches!(
        &script.steps[4],
        ScriptStep::EmitFailure { message } if message == "exploration session expired"
    ));
}

#[test]
fn persist_flag_defaults_to_false() {
    let script = parse_script(r#"{"steps":[{"op":"decline_dialog"}]}"#).expect("script");
    assert_eq!(
        script.steps,
        vec![ScriptStep::DeclineDialog { persist: false }]
    );
    assert_eq!(script.initial_preference, None);
}

#[test]
fn rejects_unknown_operations() {
    assert!(parse_script(r#"{"steps":[{"op":"rewind"}]}"#).is_err());
}

#[tokio::test]
async fn replays_lesson_against_presenter() {
    let script = parse_script(SCRIPT).expect("script");
    let store = InMemoryPreferenceStore::new();
    let source = ScriptedExplorationProgress::new();
    let mut presenter = StateScreenPresenter::new(ScreenDependencies::new(
        Arc::new(store.clone()),
        Arc::new(source.clone()),
    ));
    let mut subscriptions = presenter.handle_create_view().expect("create view");
    let mut out = Vec::new();

    replay(&script, &mut presenter, &source, &mut subscriptions, &mut out)
        .await
        .expect("replay");

    let printed = String::from_utf8(out).expect("utf8");
    assert!(printed.contains("step 1: state \"Count the apples\" (NumericInput)"));
    assert!(printed.contains("pending_answer=\"12\""));
    assert!(printed.contains("step 5: state failure"));
    assert!(printed.contains("hint=\"Write the decimal\""));

    assert_eq!(presenter.container().interaction_count(), 0);
    assert_eq!(presenter.current_state_name(), Some("Pick one"));
    assert_eq!(
        presenter.preference_snapshot(),
        PreferenceSnapshot::ALWAYS_ALLOW
    );
    assert_eq!(
        store.write_counts().await,
        WriteCounts {
            always_allow: 1,
            never_allow: 0,
        }
    );
}
