use std::fmt::{self, Write as _};

use shared::{domain::WidgetId, protocol::InteractionAnswer};
use tracing::debug;

use crate::state_projector::RenderableDecision;

pub mod layout;
pub mod number_input;

pub use layout::{Dimension, DisplayDensity, Insets, LayoutParams};
pub use number_input::{DigitsFilter, NumberInputView, NUMBER_INPUT_MAX_LENGTH};

/// Margin around the interaction widget, in density-independent pixels.
pub const INTERACTION_MARGIN_DP: u32 = 8;

/// Contract every interaction widget satisfies.
pub trait InteractionView: fmt::Debug + Send {
    fn id(&self) -> WidgetId;
    fn kind(&self) -> &'static str;
    fn hint(&self) -> &str;
    fn max_length(&self) -> usize;
    fn text(&self) -> &str;
    /// Appends what the widget's input filters let through; returns the
    /// number of characters accepted.
    fn enter_text(&mut self, input: &str) -> usize;
    fn clear_text(&mut self);
    fn pending_answer(&self) -> InteractionAnswer;
}

#[derive(Debug)]
pub struct AttachedInteraction {
    pub view: Box<dyn InteractionView>,
    pub layout: LayoutParams,
}

/// Root of the screen. Holds at most one interaction widget.
#[derive(Debug, Default)]
pub struct ViewContainer {
    interaction: Option<AttachedInteraction>,
}

impl ViewContainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn interaction(&self) -> Option<&AttachedInteraction> {
        self.interaction.as_ref()
    }

    pub fn interaction_mut(&mut self) -> Option<&mut AttachedInteraction> {
        self.interaction.as_mut()
    }

    pub fn interaction_count(&self) -> usize {
        usize::from(self.interaction.is_some())
    }

    /// Puts `attached` in the slot and hands back the previous occupant.
    pub fn replace_interaction(
        &mut self,
        attached: AttachedInteraction,
    ) -> Option<AttachedInteraction> {
        self.interaction.replace(attached)
    }

    pub fn clear_interaction(&mut self) -> Option<AttachedInteraction> {
        self.interaction.take()
    }

    /// One-line-per-node dump of the tree.
    pub fn describe(&self) -> String {
        let mut out = String::from("container\n");
        match &self.interaction {
            Some(attached) => {
                let _ = writeln!(
                    out,
                    "  {} #{} hint={:?} text={:?} max_length={} width={:?} height={:?} margin={}",
                    attached.view.kind(),
                    attached.view.id().0,
                    attached.view.hint(),
                    attached.view.text(),
                    attached.view.max_length(),
                    attached.layout.width,
                    attached.layout.height,
                    attached.layout.margins.left,
                );
            }
            None => out.push_str("  (no interaction)\n"),
        }
        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    Attached {
        widget: WidgetId,
        replaced: Option<WidgetId>,
    },
    Cleared {
        removed: Option<WidgetId>,
    },
}

pub struct ViewSynchronizer {
    density: DisplayDensity,
    next_widget_id: i64,
}

impl ViewSynchronizer {
    pub fn new(density: DisplayDensity) -> Self {
        Self {
            density,
            next_widget_id: 1,
        }
    }

    pub fn render_interaction(
        &mut self,
        decision: &RenderableDecision,
        container: &mut ViewContainer,
    ) -> RenderOutcome {
        match decision {
            RenderableDecision::None => {
                let removed = container
                    .clear_interaction()
                    .map(|attached| attached.view.id());
                if let Some(removed) = removed {
                    debug!(widget = removed.0, "removed interaction widget");
                }
                RenderOutcome::Cleared { removed }
            }
            RenderableDecision::NumericInput { placeholder } => {
                let view = NumberInputView::new(
                    self.allocate_id(),
                    placeholder.as_str(),
                    NUMBER_INPUT_MAX_LENGTH,
                    self.density,
                );
                self.attach(Box::new(view), container)
            }
        }
    }

    fn attach(
        &self,
        view: Box<dyn InteractionView>,
        container: &mut ViewContainer,
    ) -> RenderOutcome {
        let widget = view.id();
        let kind = view.kind();
        let margins = Insets::uniform(self.density.to_px(INTERACTION_MARGIN_DP));
        let layout = LayoutParams::fill_width_wrap_height(margins);
        let replaced = container
            .replace_interaction(AttachedInteraction { view, layout })
            .map(|previous| previous.view.id());
        debug!(
            widget = widget.0,
            kind,
            replaced = replaced.map(|id| id.0),
            "attached interaction widget"
        );
        RenderOutcome::Attached { widget, replaced }
    }

    fn allocate_id(&mut self) -> WidgetId {
        let id = WidgetId(self.next_widget_id);
        self.next_widget_id += 1;
        id
    }
}

#[cfg(test)]
#[path = "../tests/view_tests.rs"]
mod tests;
