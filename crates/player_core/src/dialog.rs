use std::collections::HashMap;

use shared::domain::DialogInstanceId;
use tracing::debug;

#[derive(Debug, Default)]
pub struct DialogHost {
    live: HashMap<&'static str, DialogInstanceId>,
    next_instance: i64,
}

impl DialogHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shows a fresh dialog under `tag`, removing any instance already shown
    /// under it first.
    pub fn show(&mut self, tag: &'static str) -> DialogInstanceId {
        if let Some(previous) = self.live.remove(tag) {
            debug!(tag, instance = previous.0, "removed previous dialog instance");
        }

        self.next_instance += 1;
        let instance = DialogInstanceId(self.next_instance);
        self.live.insert(tag, instance);
        debug!(tag, instance = instance.0, "showing dialog");
        instance
    }

    pub fn dismiss(&mut self, tag: &str) -> Option<DialogInstanceId> {
        let dismissed = self.live.remove(tag);
        if let Some(instance) = dismissed {
            debug!(tag, instance = instance.0, "dismissed dialog");
        }
        dismissed
    }

    pub fn live_instance(&self, tag: &str) -> Option<DialogInstanceId> {
        self.live.get(tag).copied()
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }
}
