use std::{fmt::Write as _, fs, io::Write, path::Path, time::Duration};

use anyhow::{Context, Result};
use player_core::{ScreenSubscriptions, ScriptedExplorationProgress, StateScreenPresenter};
use serde::Deserialize;
use shared::protocol::{EphemeralState, PreferenceSnapshot};

const STATE_WAIT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LessonScript {
    /// Seeds the in-memory preference store.
    #[serde(default)]
    pub initial_preference: Option<PreferenceSnapshot>,
    pub steps: Vec<ScriptStep>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ScriptStep {
    EmitState {
        state: EphemeralState,
    },
    EmitFailure {
        message: String,
    },
    AudioClick,
    ConfirmDialog {
        #[serde(default)]
        persist: bool,
    },
    DeclineDialog {
        #[serde(default)]
        persist: bool,
    },
    Type {
        text: String,
    },
}

impl ScriptStep {
    fn label(&self) -> String {
        match self {
            Self::EmitState { state } => format!(
                "state {:?} ({})",
                state.state_name, state.interaction_kind
            ),
            Self::EmitFailure { message } => format!("state failure {message:?}"),
            Self::AudioClick => "audio click".into(),
            Self::ConfirmDialog { persist } => format!("confirm dialog (persist={persist})"),
            Self::DeclineDialog { persist } => format!("decline dialog (persist={persist})"),
            Self::Type { text } => format!("type {text:?}"),
        }
    }
}

pub fn load_script(path: &Path) -> Result<LessonScript> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read lesson script '{}'", path.display()))?;
    parse_script(&raw).with_context(|| format!("invalid lesson script '{}'", path.display()))
}

pub fn parse_script(raw: &str) -> Result<LessonScript> {
    Ok(serde_json::from_str(raw)?)
}

pub async fn replay(
    script: &LessonScript,
    presenter: &mut StateScreenPresenter,
    source: &ScriptedExplorationProgress,
    subscriptions: &mut ScreenSubscriptions,
    out: &mut impl Write,
) -> Result<()> {
    if let Some(initial) = subscriptions.next_preference().await {
        presenter.handle_preference(initial);
    }

    for (index, step) in script.steps.iter().enumerate() {
        match step {
            ScriptStep::EmitState { state } => {
                source.emit_state(state.clone());
                apply_next_state(presenter, subscriptions).await?;
            }
            ScriptStep::EmitFailure { message } => {
                source.emit_failure(message.clone());
                apply_next_state(presenter, subscriptions).await?;
            }
            ScriptStep::AudioClick => {
                let outcome = presenter.handle_audio_click();
                tracing::debug!(?outcome, "audio click handled");
            }
            ScriptStep::ConfirmDialog { persist } => {
                presenter.handle_enable_audio(*persist);
                presenter.flush_pending_writes().await;
            }
            ScriptStep::DeclineDialog { persist } => {
                presenter.handle_disable_audio(*persist);
                presenter.flush_pending_writes().await;
            }
            ScriptStep::Type { text } => {
                if presenter.handle_text_entry(text).is_none() {
                    tracing::warn!("no interaction attached, dropping typed text");
                }
            }
        }

        for result in subscriptions.ready_preferences() {
            presenter.handle_preference(result);
        }

        writeln!(out, "step {}: {}", index + 1, step.label())?;
        write!(out, "{}", screen_report(presenter))?;
    }

    Ok(())
}

async fn apply_next_state(
    presenter: &mut StateScreenPresenter,
    subscriptions: &mut ScreenSubscriptions,
) -> Result<()> {
    let state = tokio::time::timeout(STATE_WAIT, subscriptions.next_state())
        .await
        .context("timed out waiting for exploration state")?
        .context("exploration feed closed")?;
    presenter.handle_ephemeral_state(state);
    Ok(())
}

pub fn screen_report(presenter: &StateScreenPresenter) -> String {
    let mut report = presenter.container().describe();
    let preference = presenter.preference_snapshot();
    let _ = writeln!(
        report,
        "  audio={:?} dialogs={} dialog_suppressed={} cellular_data_allowed={}",
        presenter.audio_visibility(),
        presenter.dialogs().live_count(),
        preference.dialog_suppressed,
        preference.cellular_data_allowed,
    );
    if let Some(answer) = presenter.pending_answer() {
        let _ = writeln!(report, "  pending_answer={:?}", answer.normalized_string);
    }
    report
}

#[cfg(test)]
#[path = "tests/script_tests.rs"]
mod tests;
