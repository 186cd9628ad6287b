use shared::domain::{AudioVisibility, DialogInstanceId, CELLULAR_DATA_DIALOG_TAG};
use tracing::debug;

use crate::{dialog::DialogHost, preference_gate::PreferenceGate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioClickOutcome {
    DialogShown(DialogInstanceId),
    Visibility(AudioVisibility),
}

#[derive(Debug, Default)]
pub struct AudioGateController {
    visibility: AudioVisibility,
}

impl AudioGateController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visibility(&self) -> AudioVisibility {
        self.visibility
    }

    pub fn on_audio_click(
        &mut self,
        preferences: &PreferenceGate,
        dialogs: &mut DialogHost,
    ) -> AudioClickOutcome {
        let snapshot = preferences.snapshot();
        if !snapshot.dialog_suppressed {
            self.set_visibility(AudioVisibility::Hidden);
            return AudioClickOutcome::DialogShown(dialogs.show(CELLULAR_DATA_DIALOG_TAG));
        }

        self.set_visibility(AudioVisibility::from_visible(
            snapshot.cellular_data_allowed,
        ));
        AudioClickOutcome::Visibility(self.visibility)
    }

    pub fn on_dialog_confirm(
        &mut self,
        persist: bool,
        preferences: &mut PreferenceGate,
        dialogs: &mut DialogHost,
    ) {
        dialogs.dismiss(CELLULAR_DATA_DIALOG_TAG);
        self.set_visibility(AudioVisibility::Visible);
        if persist {
            preferences.set_always_allow_cellular();
        }
    }

    pub fn on_dialog_decline(
        &mut self,
        persist: bool,
        preferences: &mut PreferenceGate,
        dialogs: &mut DialogHost,
    ) {
        dialogs.dismiss(CELLULAR_DATA_DIALOG_TAG);
        if persist {
            preferences.set_never_allow_cellular();
        }
    }

    fn set_visibility(&mut self, visibility: AudioVisibility) {
        if self.visibility != visibility {
            debug!(from = ?self.visibility, to = ?visibility, "audio visibility changed");
        }
        self.visibility = visibility;
    }
}

#[cfg(test)]
#[path = "tests/audio_gate_tests.rs"]
mod tests;
