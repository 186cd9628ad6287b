use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use futures::{stream, StreamExt};
use shared::{error::FetchError, protocol::PreferenceSnapshot, AsyncResult, ResultStream};
use tokio::sync::{broadcast, Mutex};

use crate::{preference_updates, PreferenceStore, PREFERENCE_SOURCE, UPDATE_CHANNEL_CAPACITY};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteCounts {
    pub always_allow: usize,
    pub never_allow: usize,
}

#[derive(Default)]
struct MemoryState {
    snapshot: PreferenceSnapshot,
    read_failure: Option<String>,
    write_failure: Option<String>,
    writes: WriteCounts,
}

/// Process-local preference store, used by tests and by the player when no
/// database is configured.
#[derive(Clone)]
pub struct InMemoryPreferenceStore {
    inner: Arc<Mutex<MemoryState>>,
    updates: broadcast::Sender<AsyncResult<PreferenceSnapshot>>,
}

impl Default for InMemoryPreferenceStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryPreferenceStore {
    pub fn new() -> Self {
        Self::with_snapshot(PreferenceSnapshot::default())
    }

    pub fn with_snapshot(snapshot: PreferenceSnapshot) -> Self {
        let (updates, _) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(Mutex::new(MemoryState {
                snapshot,
                ..MemoryState::default()
            })),
            updates,
        }
    }

    /// Makes the initial read of every later observation fail.
    pub async fn fail_reads(&self, message: impl Into<String>) {
        self.inner.lock().await.read_failure = Some(message.into());
    }

    pub async fn fail_writes(&self, message: impl Into<String>) {
        self.inner.lock().await.write_failure = Some(message.into());
    }

    /// Pushes a raw emission to every observer without touching the stored value.
    pub fn publish(&self, result: AsyncResult<PreferenceSnapshot>) {
        let _ = self.updates.send(result);
    }

    pub async fn write_counts(&self) -> WriteCounts {
        self.inner.lock().await.writes
    }

    async fn write_snapshot(
        &self,
        snapshot: PreferenceSnapshot,
        count: impl FnOnce(&mut WriteCounts),
    ) -> Result<()> {
        let mut state = self.inner.lock().await;
        count(&mut state.writes);
        if let Some(message) = &state.write_failure {
            return Err(anyhow!("preference write rejected: {message}"));
        }
        state.snapshot = snapshot;
        drop(state);

        let _ = self.updates.send(AsyncResult::Success(snapshot));
        Ok(())
    }
}

#[async_trait]
impl PreferenceStore for InMemoryPreferenceStore {
    fn observe_preference(&self) -> ResultStream<PreferenceSnapshot> {
        let updates = self.updates.subscribe();
        let inner = Arc::clone(&self.inner);
        let current = stream::once(async move {
            let state = inner.lock().await;
            match &state.read_failure {
                Some(message) => {
                    AsyncResult::Failure(FetchError::transient(PREFERENCE_SOURCE, message.clone()))
                }
                None => AsyncResult::Success(state.snapshot),
            }
        });
        current.chain(preference_updates(updates)).boxed()
    }

    async fn load(&self) -> Result<PreferenceSnapshot> {
        let state = self.inner.lock().await;
        match &state.read_failure {
            Some(message) => Err(anyhow!("preference read failed: {message}")),
            None => Ok(state.snapshot),
        }
    }

    async fn persist_always_allow_cellular(&self) -> Result<()> {
        self.write_snapshot(PreferenceSnapshot::ALWAYS_ALLOW, |writes| {
            writes.always_allow += 1
        })
        .await
    }

    async fn persist_never_allow_cellular(&self) -> Result<()> {
        self.write_snapshot(PreferenceSnapshot::NEVER_ALLOW, |writes| {
            writes.never_allow += 1
        })
        .await
    }

    async fn reset(&self) -> Result<()> {
        self.inner.lock().await.snapshot = PreferenceSnapshot::default();
        let _ = self
            .updates
            .send(AsyncResult::Success(PreferenceSnapshot::default()));
        Ok(())
    }
}
