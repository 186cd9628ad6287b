use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::{stream, StreamExt};
use shared::{error::FetchError, protocol::PreferenceSnapshot, AsyncResult, ResultStream};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Row, Sqlite,
};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};
use tokio::sync::broadcast;
use tokio_stream::wrappers::{errors::BroadcastStreamRecvError, BroadcastStream};

mod memory;

pub use memory::{InMemoryPreferenceStore, WriteCounts};

/// Name reported in fetch errors raised by preference stores.
pub const PREFERENCE_SOURCE: &str = "preference";

const UPDATE_CHANNEL_CAPACITY: usize = 64;

/// Backing store for the audio-over-cellular preference.
///
/// `observe_preference` yields the stored value first and then every later
/// write, so a subscriber never has to poll.
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    fn observe_preference(&self) -> ResultStream<PreferenceSnapshot>;
    async fn load(&self) -> Result<PreferenceSnapshot>;
    async fn persist_always_allow_cellular(&self) -> Result<()>;
    async fn persist_never_allow_cellular(&self) -> Result<()>;
    async fn reset(&self) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredPreference {
    pub snapshot: PreferenceSnapshot,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct SqlitePreferenceStore {
    pool: Pool<Sqlite>,
    updates: broadcast::Sender<AsyncResult<PreferenceSnapshot>>,
}

impl SqlitePreferenceStore {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("invalid preference database url '{database_url}'"))?
            .create_if_missing(true);
        // a single connection keeps `sqlite::memory:` databases shared
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(connect_options)
            .await
            .context("failed to open preference database")?;
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("failed to migrate preference database")?;

        let (updates, _) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);
        Ok(Self { pool, updates })
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    pub async fn load_record(&self) -> Result<Option<StoredPreference>> {
        load_record(&self.pool).await
    }

    async fn write_snapshot(&self, snapshot: PreferenceSnapshot) -> Result<()> {
        sqlx::query(
            "INSERT INTO cellular_data_preference (id, hide_dialog, use_cellular_data, updated_at)
             VALUES (1, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                hide_dialog = excluded.hide_dialog,
                use_cellular_data = excluded.use_cellular_data,
                updated_at = excluded.updated_at",
        )
        .bind(snapshot.dialog_suppressed)
        .bind(snapshot.cellular_data_allowed)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .context("failed to persist cellular data preference")?;

        tracing::debug!(
            dialog_suppressed = snapshot.dialog_suppressed,
            cellular_data_allowed = snapshot.cellular_data_allowed,
            "persisted cellular data preference"
        );
        // no live observers is not an error
        let _ = self.updates.send(AsyncResult::Success(snapshot));
        Ok(())
    }
}

#[async_trait]
impl PreferenceStore for SqlitePreferenceStore {
    fn observe_preference(&self) -> ResultStream<PreferenceSnapshot> {
        let updates = self.updates.subscribe();
        let pool = self.pool.clone();
        let current = stream::once(async move {
            match load_record(&pool).await {
                Ok(record) => AsyncResult::Success(
                    record.map(|record| record.snapshot).unwrap_or_default(),
                ),
                Err(err) => {
                    AsyncResult::Failure(FetchError::transient(PREFERENCE_SOURCE, format!("{err:#}")))
                }
            }
        });
        current.chain(preference_updates(updates)).boxed()
    }

    async fn load(&self) -> Result<PreferenceSnapshot> {
        Ok(load_record(&self.pool)
            .await?
            .map(|record| record.snapshot)
            .unwrap_or_default())
    }

    async fn persist_always_allow_cellular(&self) -> Result<()> {
        self.write_snapshot(PreferenceSnapshot::ALWAYS_ALLOW).await
    }

    async fn persist_never_allow_cellular(&self) -> Result<()> {
        self.write_snapshot(PreferenceSnapshot::NEVER_ALLOW).await
    }

    async fn reset(&self) -> Result<()> {
        sqlx::query("DELETE FROM cellular_data_preference")
            .execute(&self.pool)
            .await
            .context("failed to reset cellular data preference")?;
        let _ = self
            .updates
            .send(AsyncResult::Success(PreferenceSnapshot::default()));
        Ok(())
    }
}

async fn load_record(pool: &Pool<Sqlite>) -> Result<Option<StoredPreference>> {
    let row = sqlx::query(
        "SELECT hide_dialog, use_cellular_data, updated_at
         FROM cellular_data_preference WHERE id = 1",
    )
    .fetch_optional(pool)
    .await
    .context("failed to read cellular data preference")?;

    Ok(row.map(|r| StoredPreference {
        snapshot: PreferenceSnapshot {
            dialog_suppressed: r.get::<bool, _>(0),
            cellular_data_allowed: r.get::<bool, _>(1),
        },
        updated_at: r.get::<DateTime<Utc>, _>(2),
    }))
}

/// Turns a broadcast receiver into the update tail of an observation stream.
///
/// A lagged receiver surfaces as a failure; observers keep their cached value
/// and pick up the next update.
pub(crate) fn preference_updates(
    updates: broadcast::Receiver<AsyncResult<PreferenceSnapshot>>,
) -> impl futures::Stream<Item = AsyncResult<PreferenceSnapshot>> + Send + 'static {
    BroadcastStream::new(updates).map(|item| match item {
        Ok(result) => result,
        Err(BroadcastStreamRecvError::Lagged(skipped)) => AsyncResult::Failure(
            FetchError::transient(PREFERENCE_SOURCE, format!("missed {skipped} preference updates")),
        ),
    })
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if database_url.starts_with("sqlite::memory:") || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
