use std::sync::Arc;

use player_core::{
    AudioClickOutcome, ScreenDependencies, ScriptedExplorationProgress, StateScreenPresenter,
};
use shared::{domain::AudioVisibility, protocol::PreferenceSnapshot};
use storage::{PreferenceStore, SqlitePreferenceStore};

async fn open_screen(store: &SqlitePreferenceStore) -> StateScreenPresenter {
    let preferences: Arc<dyn PreferenceStore> = Arc::new(store.clone());
    let mut presenter = StateScreenPresenter::new(ScreenDependencies::new(
        preferences,
        Arc::new(ScriptedExplorationProgress::new()),
    ));
    let mut subscriptions = presenter.handle_create_view().expect("create view");
    let initial = subscriptions
        .next_preference()
        .await
        .expect("initial preference");
    presenter.handle_preference(initial);
    presenter
}

#[tokio::test]
async fn declined_choice_is_remembered_by_the_next_screen() {
    let temp_root = tempfile::tempdir().expect("tempdir");
    let db_path = temp_root.path().join("player.db");
    let database_url = format!("sqlite://{}", db_path.to_string_lossy().replace('\\', "/"));
    let store = SqlitePreferenceStore::new(&database_url)
        .await
        .expect("open store");

    let mut first = open_screen(&store).await;
    assert!(matches!(
        first.handle_audio_click(),
        AudioClickOutcome::DialogShown(_)
    ));
    first.handle_disable_audio(true);
    first.flush_pending_writes().await;
    assert_eq!(first.dialogs().live_count(), 0);
    drop(first);

    assert_eq!(
        store.load().await.expect("load"),
        PreferenceSnapshot::NEVER_ALLOW
    );

    let mut second = open_screen(&store).await;
    assert_eq!(second.preference_snapshot(), PreferenceSnapshot::NEVER_ALLOW);
    assert_eq!(
        second.handle_audio_click(),
        AudioClickOutcome::Visibility(AudioVisibility::Hidden)
    );
    assert_eq!(second.dialogs().live_count(), 0);
}
