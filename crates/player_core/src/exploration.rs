use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

use futures::{stream, StreamExt};
use shared::{error::FetchError, protocol::EphemeralState, AsyncResult, ResultStream};
use tokio::sync::broadcast;
use tokio_stream::wrappers::{errors::BroadcastStreamRecvError, BroadcastStream};

/// Name reported in fetch errors raised by exploration sources.
pub const EXPLORATION_SOURCE: &str = "exploration";

const PROGRESS_CHANNEL_CAPACITY: usize = 64;

pub trait ExplorationProgressSource: Send + Sync {
    /// Opens a new subscription to the current exploration step.
    fn current_state(&self) -> ResultStream<EphemeralState>;
}

/// Source fed by hand: each `emit` reaches every open subscription, and a new
/// subscription first receives the latest emission.
#[derive(Clone)]
pub struct ScriptedExplorationProgress {
    latest: Arc<Mutex<Option<AsyncResult<EphemeralState>>>>,
    updates: broadcast::Sender<AsyncResult<EphemeralState>>,
    subscriptions: Arc<AtomicUsize>,
}

impl Default for ScriptedExplorationProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedExplorationProgress {
    pub fn new() -> Self {
        let (updates, _) = broadcast::channel(PROGRESS_CHANNEL_CAPACITY);
        Self {
            latest: Arc::new(Mutex::new(None)),
            updates,
            subscriptions: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn emit(&self, result: AsyncResult<EphemeralState>) {
        if let Ok(mut latest) = self.latest.lock() {
            *latest = Some(result.clone());
        }
        let _ = self.updates.send(result);
    }

    pub fn emit_state(&self, state: EphemeralState) {
        self.emit(AsyncResult::Success(state));
    }

    pub fn emit_failure(&self, message: impl Into<String>) {
        self.emit(AsyncResult::Failure(FetchError::transient(
            EXPLORATION_SOURCE,
            message,
        )));
    }

    /// Number of times `current_state` has been called.
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.load(Ordering::SeqCst)
    }

    /// Subscriptions returned by `current_state` that are still held.
    pub fn live_subscriptions(&self) -> usize {
        self.updates.receiver_count()
    }
}

impl ExplorationProgressSource for ScriptedExplorationProgress {
    fn current_state(&self) -> ResultStream<EphemeralState> {
        self.subscriptions.fetch_add(1, Ordering::SeqCst);
        let updates = self.updates.subscribe();
        let latest = self
            .latest
            .lock()
            .map(|latest| latest.clone())
            .unwrap_or_default();

        stream::iter(latest)
            .chain(BroadcastStream::new(updates).map(|item| match item {
                Ok(result) => result,
                Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                    AsyncResult::Failure(FetchError::transient(
                        EXPLORATION_SOURCE,
                        format!("missed {skipped} exploration updates"),
                    ))
                }
            }))
            .boxed()
    }
}
