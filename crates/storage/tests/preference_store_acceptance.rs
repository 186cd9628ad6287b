use futures::StreamExt;
use shared::{protocol::PreferenceSnapshot, AsyncResult};
use storage::{PreferenceStore, SqlitePreferenceStore};

#[tokio::test]
async fn persisted_choice_survives_reopening_the_database() {
    let temp_root = tempfile::tempdir().expect("tempdir");
    let db_path = temp_root.path().join("preferences.db");
    let database_url = format!("sqlite://{}", db_path.to_string_lossy().replace('\\', "/"));

    let store = SqlitePreferenceStore::new(&database_url)
        .await
        .expect("first open");
    store
        .persist_always_allow_cellular()
        .await
        .expect("always allow");
    store.pool().close().await;
    drop(store);

    let reopened = SqlitePreferenceStore::new(&database_url)
        .await
        .expect("second open");
    let first = reopened
        .observe_preference()
        .next()
        .await
        .expect("initial emission");
    assert_eq!(first, AsyncResult::Success(PreferenceSnapshot::ALWAYS_ALLOW));
}
