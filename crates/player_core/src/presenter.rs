use std::{ops::ControlFlow, sync::Arc};

use futures::{stream::BoxStream, FutureExt, StreamExt};
use shared::{
    domain::AudioVisibility,
    protocol::{EphemeralState, InteractionAnswer, PreferenceSnapshot},
    AsyncResult, ResultStream,
};
use storage::PreferenceStore;
use tokio::sync::mpsc;
use tracing::{debug, info, trace, warn};

use crate::{
    audio_gate::{AudioClickOutcome, AudioGateController},
    dialog::DialogHost,
    error::PlayerError,
    exploration::ExplorationProgressSource,
    preference_gate::PreferenceGate,
    state_projector::{EphemeralStateFeed, InteractionRegistry, Projection, RenderableDecision},
    view::{DisplayDensity, RenderOutcome, ViewContainer, ViewSynchronizer},
};

pub struct ScreenDependencies {
    pub preferences: Arc<dyn PreferenceStore>,
    pub exploration: Arc<dyn ExplorationProgressSource>,
    pub density: DisplayDensity,
    pub registry: InteractionRegistry,
}

impl ScreenDependencies {
    pub fn new(
        preferences: Arc<dyn PreferenceStore>,
        exploration: Arc<dyn ExplorationProgressSource>,
    ) -> Self {
        Self {
            preferences,
            exploration,
            density: DisplayDensity::default(),
            registry: InteractionRegistry::default(),
        }
    }

    pub fn with_density(mut self, density: DisplayDensity) -> Self {
        self.density = density;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenEvent {
    AudioClicked,
    EnableAudio { save_user_choice: bool },
    DisableAudio { save_user_choice: bool },
    TextEntered(String),
    Destroy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeardownReason {
    Destroyed,
    UiClosed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenTeardown {
    pub reason: TeardownReason,
    /// Preference writes still in flight; they are not awaited.
    pub pending_writes: usize,
}

/// The two subscriptions opened when the screen's view is created.
/// Dropping this cancels both.
pub struct ScreenSubscriptions {
    preferences: ResultStream<PreferenceSnapshot>,
    states: BoxStream<'static, EphemeralState>,
}

impl ScreenSubscriptions {
    pub async fn next_preference(&mut self) -> Option<AsyncResult<PreferenceSnapshot>> {
        self.preferences.next().await
    }

    pub async fn next_state(&mut self) -> Option<EphemeralState> {
        self.states.next().await
    }

    /// Preference emissions that can be taken without waiting.
    pub fn ready_preferences(&mut self) -> Vec<AsyncResult<PreferenceSnapshot>> {
        let mut ready = Vec::new();
        while let Some(Some(result)) = self.preferences.next().now_or_never() {
            ready.push(result);
        }
        ready
    }
}

pub struct StateScreenPresenter {
    preferences: PreferenceGate,
    feed: EphemeralStateFeed,
    registry: InteractionRegistry,
    synchronizer: ViewSynchronizer,
    container: ViewContainer,
    audio: AudioGateController,
    dialogs: DialogHost,
    current_state: Option<EphemeralState>,
    view_created: bool,
}

impl StateScreenPresenter {
    pub fn new(dependencies: ScreenDependencies) -> Self {
        Self {
            preferences: PreferenceGate::new(dependencies.preferences),
            feed: EphemeralStateFeed::new(dependencies.exploration),
            registry: dependencies.registry,
            synchronizer: ViewSynchronizer::new(dependencies.density),
            container: ViewContainer::new(),
            audio: AudioGateController::new(),
            dialogs: DialogHost::new(),
            current_state: None,
            view_created: false,
        }
    }

    /// Opens the preference and ephemeral state subscriptions. Only the first
    /// call per screen succeeds.
    pub fn handle_create_view(&mut self) -> Result<ScreenSubscriptions, PlayerError> {
        if self.view_created {
            return Err(PlayerError::ViewAlreadyCreated);
        }

        let states = self.feed.subscribe()?;
        let preferences = self.preferences.observe_preference();
        self.view_created = true;
        info!("state screen subscriptions opened");
        Ok(ScreenSubscriptions {
            preferences,
            states,
        })
    }

    pub fn handle_preference(&mut self, result: AsyncResult<PreferenceSnapshot>) {
        self.preferences.apply(result);
    }

    pub fn handle_ephemeral_state(&mut self, state: EphemeralState) -> RenderOutcome {
        debug!(state = %state.state_name, "received current state");

        let decision = match self.registry.derive_renderable_decision(&state) {
            Projection::Render(decision) => decision,
            Projection::Invalid(err) => {
                warn!(
                    state = %state.state_name,
                    kind = %state.interaction_kind,
                    key = err.key(),
                    "cannot render interaction: {err}"
                );
                RenderableDecision::None
            }
            Projection::Unsupported { kind } => {
                trace!(%kind, "no renderer registered for interaction kind");
                RenderableDecision::None
            }
        };

        self.current_state = Some(state);
        self.synchronizer
            .render_interaction(&decision, &mut self.container)
    }

    pub fn handle_audio_click(&mut self) -> AudioClickOutcome {
        self.audio
            .on_audio_click(&self.preferences, &mut self.dialogs)
    }

    pub fn handle_enable_audio(&mut self, save_user_choice: bool) {
        self.audio
            .on_dialog_confirm(save_user_choice, &mut self.preferences, &mut self.dialogs);
    }

    pub fn handle_disable_audio(&mut self, save_user_choice: bool) {
        self.audio
            .on_dialog_decline(save_user_choice, &mut self.preferences, &mut self.dialogs);
    }

    /// Types into the attached interaction widget. Returns `None` when no
    /// widget is attached.
    pub fn handle_text_entry(&mut self, text: &str) -> Option<usize> {
        let attached = self.container.interaction_mut()?;
        Some(attached.view.enter_text(text))
    }

    pub fn handle_event(&mut self, event: ScreenEvent) -> ControlFlow<TeardownReason> {
        match event {
            ScreenEvent::AudioClicked => {
                self.handle_audio_click();
            }
            ScreenEvent::EnableAudio { save_user_choice } => {
                self.handle_enable_audio(save_user_choice)
            }
            ScreenEvent::DisableAudio { save_user_choice } => {
                self.handle_disable_audio(save_user_choice)
            }
            ScreenEvent::TextEntered(text) => {
                if self.handle_text_entry(&text).is_none() {
                    debug!("text entered with no interaction attached");
                }
            }
            ScreenEvent::Destroy => return ControlFlow::Break(TeardownReason::Destroyed),
        }
        ControlFlow::Continue(())
    }

    /// Serves both subscriptions and UI events on the calling task until the
    /// screen is destroyed. Ready source emissions are applied before UI
    /// events; a source that ends is dropped from the loop.
    pub async fn run(
        &mut self,
        subscriptions: ScreenSubscriptions,
        mut ui_events: mpsc::Receiver<ScreenEvent>,
    ) -> ScreenTeardown {
        let ScreenSubscriptions {
            mut preferences,
            mut states,
        } = subscriptions;
        let mut preferences_open = true;
        let mut states_open = true;

        let reason = loop {
            tokio::select! {
                biased;

                item = preferences.next(), if preferences_open => match item {
                    Some(result) => self.handle_preference(result),
                    None => {
                        warn!("preference stream ended");
                        preferences_open = false;
                    }
                },
                item = states.next(), if states_open => match item {
                    Some(state) => {
                        self.handle_ephemeral_state(state);
                    }
                    None => {
                        warn!("ephemeral state stream ended");
                        states_open = false;
                    }
                },
                event = ui_events.recv() => match event {
                    Some(event) => {
                        if let ControlFlow::Break(reason) = self.handle_event(event) {
                            break reason;
                        }
                    }
                    None => break TeardownReason::UiClosed,
                },
            }
        };

        drop(preferences);
        drop(states);
        let teardown = ScreenTeardown {
            reason,
            pending_writes: self.preferences.pending_write_count(),
        };
        info!(
            reason = ?teardown.reason,
            pending_writes = teardown.pending_writes,
            "state screen torn down"
        );
        teardown
    }

    pub async fn flush_pending_writes(&mut self) {
        self.preferences.flush_pending_writes().await;
    }

    pub fn pending_answer(&self) -> Option<InteractionAnswer> {
        self.container
            .interaction()
            .map(|attached| attached.view.pending_answer())
    }

    pub fn container(&self) -> &ViewContainer {
        &self.container
    }

    pub fn dialogs(&self) -> &DialogHost {
        &self.dialogs
    }

    pub fn audio_visibility(&self) -> AudioVisibility {
        self.audio.visibility()
    }

    pub fn preference_snapshot(&self) -> PreferenceSnapshot {
        self.preferences.snapshot()
    }

    pub fn current_state_name(&self) -> Option<&str> {
        self.current_state
            .as_ref()
            .map(|state| state.state_name.as_str())
    }
}

#[cfg(test)]
#[path = "tests/presenter_tests.rs"]
mod tests;
