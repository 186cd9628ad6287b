use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use futures::{stream, stream::BoxStream, StreamExt};
use shared::{
    domain::{NUMERIC_INPUT, PLACEHOLDER_ARG},
    error::CustomizationArgError,
    protocol::EphemeralState,
    AsyncResult, ResultStream,
};
use tokio::{runtime::Handle, sync::broadcast};
use tokio_stream::wrappers::{errors::BroadcastStreamRecvError, BroadcastStream};
use tracing::{debug, error, trace, warn};

use crate::{error::PlayerError, exploration::ExplorationProgressSource};

const FEED_CHANNEL_CAPACITY: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderableDecision {
    None,
    NumericInput { placeholder: String },
}

impl RenderableDecision {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::NumericInput { .. } => NUMERIC_INPUT,
        }
    }
}

/// Outcome of projecting one step through the [`InteractionRegistry`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Projection {
    Render(RenderableDecision),
    Unsupported { kind: String },
    Invalid(CustomizationArgError),
}

impl Projection {
    /// What the view should show; anything that cannot be rendered shows nothing.
    pub fn into_decision(self) -> RenderableDecision {
        match self {
            Self::Render(decision) => decision,
            Self::Unsupported { .. } | Self::Invalid(_) => RenderableDecision::None,
        }
    }
}

pub type InteractionProjector =
    fn(&EphemeralState) -> Result<RenderableDecision, CustomizationArgError>;

/// Interaction kind id -> projector. New interaction kinds register here.
#[derive(Clone)]
pub struct InteractionRegistry {
    projectors: HashMap<String, InteractionProjector>,
}

impl Default for InteractionRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(NUMERIC_INPUT, project_numeric_input);
        registry
    }
}

impl InteractionRegistry {
    pub fn empty() -> Self {
        Self {
            projectors: HashMap::new(),
        }
    }

    pub fn register(
        &mut self,
        kind: impl Into<String>,
        projector: InteractionProjector,
    ) -> Option<InteractionProjector> {
        self.projectors.insert(kind.into(), projector)
    }

    pub fn supports(&self, kind: &str) -> bool {
        self.projectors.contains_key(kind)
    }

    pub fn derive_renderable_decision(&self, state: &EphemeralState) -> Projection {
        if state.interaction_kind.is_empty() {
            return Projection::Render(RenderableDecision::None);
        }

        match self.projectors.get(&state.interaction_kind) {
            Some(projector) => match projector(state) {
                Ok(decision) => Projection::Render(decision),
                Err(err) => Projection::Invalid(err),
            },
            None => Projection::Unsupported {
                kind: state.interaction_kind.clone(),
            },
        }
    }
}

fn project_numeric_input(
    state: &EphemeralState,
) -> Result<RenderableDecision, CustomizationArgError> {
    let placeholder = state.normalized_string_arg(PLACEHOLDER_ARG)?;
    Ok(RenderableDecision::NumericInput {
        placeholder: placeholder.to_string(),
    })
}

/// Maps one upstream emission to the state the screen should show.
///
/// Failures become the empty default state; pending emissions carry nothing
/// to show and are dropped.
pub fn process_current_state(result: AsyncResult<EphemeralState>) -> Option<EphemeralState> {
    match result {
        AsyncResult::Success(state) => Some(state),
        AsyncResult::Failure(err) => {
            error!(
                source = err.source_name(),
                "failed to retrieve ephemeral state: {err}"
            );
            Some(EphemeralState::default())
        }
        AsyncResult::Pending => {
            trace!("ephemeral state still loading");
            None
        }
    }
}

#[derive(Default)]
struct FeedSlot {
    generation: u64,
    active: Option<broadcast::Sender<EphemeralState>>,
    latest: Option<EphemeralState>,
}

fn lock_slot(slot: &Mutex<FeedSlot>) -> MutexGuard<'_, FeedSlot> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Derived, memoized stream of ephemeral states.
///
/// The first `subscribe` opens the single upstream subscription; later
/// subscribers share it and start from the latest mapped state. Once no
/// subscriber is left the upstream subscription is released at its next
/// emission, and the following `subscribe` opens a fresh one.
pub struct EphemeralStateFeed {
    source: Arc<dyn ExplorationProgressSource>,
    slot: Arc<Mutex<FeedSlot>>,
}

impl EphemeralStateFeed {
    pub fn new(source: Arc<dyn ExplorationProgressSource>) -> Self {
        Self {
            source,
            slot: Arc::new(Mutex::new(FeedSlot::default())),
        }
    }

    pub fn is_connected(&self) -> bool {
        lock_slot(&self.slot).active.is_some()
    }

    pub fn subscribe(&self) -> Result<BoxStream<'static, EphemeralState>, PlayerError> {
        let mut slot = lock_slot(&self.slot);
        let existing = slot
            .active
            .as_ref()
            .map(|sender| (sender.subscribe(), slot.latest.clone()));
        let (receiver, replay) = match existing {
            Some(existing) => existing,
            None => {
                let runtime = Handle::try_current().map_err(|_| PlayerError::NoRuntime {
                    operation: "ephemeral state subscription",
                })?;
                let (sender, receiver) = broadcast::channel(FEED_CHANNEL_CAPACITY);
                slot.generation += 1;
                slot.active = Some(sender.clone());
                slot.latest = None;
                debug!(
                    generation = slot.generation,
                    "opening upstream exploration subscription"
                );
                runtime.spawn(forward_states(
                    self.source.current_state(),
                    sender,
                    Arc::clone(&self.slot),
                    slot.generation,
                ));
                (receiver, None)
            }
        };
        drop(slot);

        let live = BroadcastStream::new(receiver).filter_map(|item| async move {
            match item {
                Ok(state) => Some(state),
                Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                    warn!(skipped, "ephemeral state observer lagged, skipping to newest");
                    None
                }
            }
        });
        Ok(stream::iter(replay).chain(live).boxed())
    }
}

async fn forward_states(
    mut upstream: ResultStream<EphemeralState>,
    sender: broadcast::Sender<EphemeralState>,
    slot: Arc<Mutex<FeedSlot>>,
    generation: u64,
) {
    loop {
        let result = tokio::select! {
            item = upstream.next() => match item {
                Some(result) => result,
                None => {
                    debug!(generation, "exploration stream ended");
                    break;
                }
            },
            () = sender.closed() => {
                let mut guard = lock_slot(&slot);
                // a subscribe may have attached since `closed` resolved
                if sender.receiver_count() == 0 {
                    release(&mut guard, generation);
                    return;
                }
                continue;
            }
        };

        let Some(state) = process_current_state(result) else {
            continue;
        };

        let mut guard = lock_slot(&slot);
        if sender.receiver_count() == 0 {
            release(&mut guard, generation);
            return;
        }
        if guard.generation == generation {
            guard.latest = Some(state.clone());
        }
        let _ = sender.send(state);
    }

    release(&mut lock_slot(&slot), generation);
}

/// Detaches the forwarder of `generation` while the slot lock is held, so no
/// subscriber can join a sender that is about to go away.
fn release(slot: &mut FeedSlot, generation: u64) {
    if slot.generation == generation {
        slot.active = None;
        slot.latest = None;
        debug!(generation, "released upstream exploration subscription");
    }
}

#[cfg(test)]
#[path = "tests/state_projector_tests.rs"]
mod tests;
