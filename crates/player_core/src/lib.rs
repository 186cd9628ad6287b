//! Exploration player state screen: observes the exploration and preference
//! sources and keeps a headless view tree in sync with them.

pub mod audio_gate;
pub mod dialog;
pub mod error;
pub mod exploration;
pub mod preference_gate;
pub mod presenter;
pub mod state_projector;
pub mod view;

pub use audio_gate::{AudioClickOutcome, AudioGateController};
pub use dialog::DialogHost;
pub use error::PlayerError;
pub use exploration::{ExplorationProgressSource, ScriptedExplorationProgress};
pub use preference_gate::PreferenceGate;
pub use presenter::{
    ScreenDependencies, ScreenEvent, ScreenSubscriptions, ScreenTeardown, StateScreenPresenter,
    TeardownReason,
};
pub use state_projector::{
    EphemeralStateFeed, InteractionRegistry, Projection, RenderableDecision,
};
pub use view::{DisplayDensity, InteractionView, RenderOutcome, ViewContainer, ViewSynchronizer};
