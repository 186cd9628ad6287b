use std::sync::Arc;

use super::*;
use shared::{protocol::PreferenceSnapshot, AsyncResult};
use storage::{InMemoryPreferenceStore, WriteCounts};

fn gate_with(snapshot: PreferenceSnapshot) -> (PreferenceGate, InMemoryPreferenceStore) {
    let store = InMemoryPreferenceStore::new();
    let mut gate = PreferenceGate::new(Arc::new(store.clone()));
    gate.apply(AsyncResult::Success(snapshot));
    (gate, store)
}

#[test]
fn click_without_suppression_always_requests_dialog() {
    for cellular_data_allowed in [false, true] {
        let (gate, _store) = gate_with(PreferenceSnapshot {
            dialog_suppressed: false,
            cellular_data_allowed,
        });
        let mut dialogs = DialogHost::new();
        let mut audio = AudioGateController::new();

        let outcome = audio.on_audio_click(&gate, &mut dialogs);

        assert!(matches!(outcome, AudioClickOutcome::DialogShown(_)));
        assert_eq!(audio.visibility(), AudioVisibility::Hidden);
        assert_eq!(dialogs.live_count(), 1);
    }
}

#[test]
fn repeated_clicks_keep_a_single_dialog() {
    let (gate, _store) = gate_with(PreferenceSnapshot::default());
    let mut dialogs = DialogHost::new();
    let mut audio = AudioGateController::new();

    audio.on_audio_click(&gate, &mut dialogs);
    let AudioClickOutcome::DialogShown(second) = audio.on_audio_click(&gate, &mut dialogs) else {
        panic!("dialog should be shown");
    };

    assert_eq!(dialogs.live_count(), 1);
    assert_eq!(dialogs.live_instance(CELLULAR_DATA_DIALOG_TAG), Some(second));
}

#[test]
fn suppressed_dialog_follows_cellular_choice() {
    let (gate, _store) = gate_with(PreferenceSnapshot::NEVER_ALLOW);
    let mut dialogs = DialogHost::new();
    let mut audio = AudioGateController::new();
    assert_eq!(
        audio.on_audio_click(&gate, &mut dialogs),
        AudioClickOutcome::Visibility(AudioVisibility::Hidden)
    );
    assert_eq!(dialogs.live_count(), 0);

    let (gate, _store) = gate_with(PreferenceSnapshot::ALWAYS_ALLOW);
    assert_eq!(
        audio.on_audio_click(&gate, &mut dialogs),
        AudioClickOutcome::Visibility(AudioVisibility::Visible)
    );
    assert_eq!(dialogs.live_count(), 0);
}

#[tokio::test]
async fn confirm_with_persist_shows_audio_and_writes_once() {
    let (mut gate, store) = gate_with(PreferenceSnapshot::default());
    let mut dialogs = DialogHost::new();
    let mut audio = AudioGateController::new();

    audio.on_audio_click(&gate, &mut dialogs);
    audio.on_dialog_confirm(true, &mut gate, &mut dialogs);
    gate.flush_pending_writes().await;

    assert_eq!(audio.visibility(), AudioVisibility::Visible);
    assert_eq!(dialogs.live_count(), 0);
    assert_eq!(
        store.write_counts().await,
        WriteCounts {
            always_allow: 1,
            never_allow: 0,
        }
    );
}

#[tokio::test]
async fn confirm_without_persist_shows_audio_without_writing() {
    let (mut gate, store) = gate_with(PreferenceSnapshot::default());
    let mut dialogs = DialogHost::new();
    let mut audio = AudioGateController::new();

    audio.on_dialog_confirm(false, &mut gate, &mut dialogs);
    gate.flush_pending_writes().await;

    assert_eq!(audio.visibility(), AudioVisibility::Visible);
    assert_eq!(store.write_counts().await, WriteCounts::default());
}

#[tokio::test]
async fn decline_keeps_audio_hidden_and_persists_on_request() {
    let (mut gate, store) = gate_with(PreferenceSnapshot::default());
    let mut dialogs = DialogHost::new();
    let mut audio = AudioGateController::new();

    audio.on_audio_click(&gate, &mut dialogs);
    audio.on_dialog_decline(false, &mut gate, &mut dialogs);
    audio.on_audio_click(&gate, &mut dialogs);
    audio.on_dialog_decline(true, &mut gate, &mut dialogs);
    gate.flush_pending_writes().await;

    assert_eq!(audio.visibility(), AudioVisibility::Hidden);
    assert_eq!(dialogs.live_count(), 0);
    assert_eq!(
        store.write_counts().await,
        WriteCounts {
            always_allow: 0,
            never_allow: 1,
        }
    );
}

#[tokio::test]
async fn decline_after_confirm_leaves_audio_visible() {
    let (mut gate, store) = gate_with(PreferenceSnapshot::default());
    let mut dialogs = DialogHost::new();
    let mut audio = AudioGateController::new();

    audio.on_audio_click(&gate, &mut dialogs);
    audio.on_dialog_confirm(false, &mut gate, &mut dialogs);
    audio.on_dialog_decline(true, &mut gate, &mut dialogs);
    gate.flush_pending_writes().await;

    assert_eq!(audio.visibility(), AudioVisibility::Visible);
    assert_eq!(dialogs.live_count(), 0);
    assert_eq!(
        store.write_counts().await,
        WriteCounts {
            always_allow: 0,
            never_allow: 1,
        }
    );
}
