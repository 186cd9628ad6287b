use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub i64);
    };
}

id_newtype!(WidgetId);
id_newtype!(DialogInstanceId);

/// Interaction id carried by lesson steps that ask for a number.
pub const NUMERIC_INPUT: &str = "NumericInput";

/// Customization arg holding a widget's hint text.
pub const PLACEHOLDER_ARG: &str = "placeholder";

/// Tag under which the cellular data confirmation dialog is shown.
pub const CELLULAR_DATA_DIALOG_TAG: &str = "CELLULAR_DATA_DIALOG";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioVisibility {
    #[default]
    Hidden,
    Visible,
}

impl AudioVisibility {
    pub fn from_visible(is_visible: bool) -> Self {
        if is_visible {
            Self::Visible
        } else {
            Self::Hidden
        }
    }

    pub fn is_visible(self) -> bool {
        self == Self::Visible
    }
}
