use shared::{
    domain::{WidgetId, NUMERIC_INPUT},
    protocol::InteractionAnswer,
};

use super::{
    layout::{DisplayDensity, Insets},
    InteractionView,
};

pub const NUMBER_INPUT_MAX_LENGTH: usize = 200;
pub const NUMBER_INPUT_PADDING_DP: u32 = 8;
const NUMBER_INPUT_ACCEPTED: &str = "0123456789.";

/// Input filter that only lets through a fixed set of characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DigitsFilter {
    accepted: &'static str,
}

impl DigitsFilter {
    pub fn numeric() -> Self {
        Self {
            accepted: NUMBER_INPUT_ACCEPTED,
        }
    }

    pub fn accepted(&self) -> &'static str {
        self.accepted
    }

    pub fn accepts(&self, ch: char) -> bool {
        self.accepted.contains(ch)
    }
}

/// Text entry for numeric answers.
#[derive(Debug, Clone)]
pub struct NumberInputView {
    id: WidgetId,
    hint: String,
    max_length: usize,
    padding: Insets,
    filter: DigitsFilter,
    text: String,
}

impl NumberInputView {
    pub fn new(
        id: WidgetId,
        placeholder: impl Into<String>,
        max_length: usize,
        density: DisplayDensity,
    ) -> Self {
        Self {
            id,
            hint: placeholder.into(),
            max_length,
            padding: Insets::uniform(density.to_px(NUMBER_INPUT_PADDING_DP)),
            filter: DigitsFilter::numeric(),
            text: String::new(),
        }
    }

    pub fn padding(&self) -> Insets {
        self.padding
    }

    pub fn filter(&self) -> DigitsFilter {
        self.filter
    }
}

impl InteractionView for NumberInputView {
    fn id(&self) -> WidgetId {
        self.id
    }

    fn kind(&self) -> &'static str {
        NUMERIC_INPUT
    }

    fn hint(&self) -> &str {
        &self.hint
    }

    fn max_length(&self) -> usize {
        self.max_length
    }

    fn text(&self) -> &str {
        &self.text
    }

    fn enter_text(&mut self, input: &str) -> usize {
        let room = self.max_length.saturating_sub(self.text.chars().count());
        let filter = self.filter;
        let before = self.text.len();
        self.text
            .extend(input.chars().filter(|ch| filter.accepts(*ch)).take(room));
        self.text[before..].chars().count()
    }

    fn clear_text(&mut self) {
        self.text.clear();
    }

    fn pending_answer(&self) -> InteractionAnswer {
        InteractionAnswer::normalized(self.text.clone())
    }
}
