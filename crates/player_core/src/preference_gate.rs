use std::sync::Arc;

use shared::{protocol::PreferenceSnapshot, AsyncResult, ResultStream};
use storage::PreferenceStore;
use tokio::{runtime::Handle, task::JoinHandle};
use tracing::{debug, error};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PreferenceWrite {
    AlwaysAllow,
    NeverAllow,
}

impl PreferenceWrite {
    fn as_str(self) -> &'static str {
        match self {
            Self::AlwaysAllow => "always_allow_cellular",
            Self::NeverAllow => "never_allow_cellular",
        }
    }
}

/// Holds the last successfully read [`PreferenceSnapshot`] so UI actions can
/// decide synchronously. Failed reads keep the previous value.
pub struct PreferenceGate {
    store: Arc<dyn PreferenceStore>,
    snapshot: PreferenceSnapshot,
    pending_writes: Vec<JoinHandle<()>>,
}

impl PreferenceGate {
    pub fn new(store: Arc<dyn PreferenceStore>) -> Self {
        Self {
            store,
            snapshot: PreferenceSnapshot::default(),
            pending_writes: Vec::new(),
        }
    }

    pub fn observe_preference(&self) -> ResultStream<PreferenceSnapshot> {
        self.store.observe_preference()
    }

    pub fn snapshot(&self) -> PreferenceSnapshot {
        self.snapshot
    }

    /// Folds one emission into the cache. Returns true when the cached value changed.
    pub fn apply(&mut self, result: AsyncResult<PreferenceSnapshot>) -> bool {
        match result {
            AsyncResult::Success(snapshot) => {
                let changed = snapshot != self.snapshot;
                self.snapshot = snapshot;
                debug!(
                    dialog_suppressed = snapshot.dialog_suppressed,
                    cellular_data_allowed = snapshot.cellular_data_allowed,
                    "preference snapshot updated"
                );
                changed
            }
            AsyncResult::Failure(err) => {
                error!(
                    source = err.source_name(),
                    "failed to read cellular data preference, keeping last known value: {err}"
                );
                false
            }
            AsyncResult::Pending => false,
        }
    }

    pub fn set_always_allow_cellular(&mut self) {
        self.spawn_write(PreferenceWrite::AlwaysAllow);
    }

    pub fn set_never_allow_cellular(&mut self) {
        self.spawn_write(PreferenceWrite::NeverAllow);
    }

    pub fn pending_write_count(&self) -> usize {
        self.pending_writes
            .iter()
            .filter(|handle| !handle.is_finished())
            .count()
    }

    /// Waits for every write issued so far. Screens never call this on teardown.
    pub async fn flush_pending_writes(&mut self) {
        for handle in self.pending_writes.drain(..) {
            if let Err(err) = handle.await {
                error!("preference write task failed: {err}");
            }
        }
    }

    fn spawn_write(&mut self, write: PreferenceWrite) {
        let Ok(runtime) = Handle::try_current() else {
            error!(
                write = write.as_str(),
                "no async runtime available, dropping preference write"
            );
            return;
        };

        self.pending_writes.retain(|handle| !handle.is_finished());
        let store = Arc::clone(&self.store);
        self.pending_writes.push(runtime.spawn(async move {
            let outcome = match write {
                PreferenceWrite::AlwaysAllow => store.persist_always_allow_cellular().await,
                PreferenceWrite::NeverAllow => store.persist_never_allow_cellular().await,
            };
            match outcome {
                Ok(()) => debug!(write = write.as_str(), "preference write completed"),
                Err(err) => error!(write = write.as_str(), "preference write failed: {err:#}"),
            }
        }));
    }
}

#[cfg(test)]
#[path = "tests/preference_gate_tests.rs"]
mod tests;
