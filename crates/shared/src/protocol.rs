use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::CustomizationArgError;

pub type CustomizationArgs = BTreeMap<String, CustomizationValue>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomizationValue {
    NormalizedString(String),
    SignedInt(i64),
    NonNegativeInt(u64),
    Real(f64),
    Bool(bool),
}

impl CustomizationValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::NormalizedString(_) => "normalized_string",
            Self::SignedInt(_) => "signed_int",
            Self::NonNegativeInt(_) => "non_negative_int",
            Self::Real(_) => "real",
            Self::Bool(_) => "bool",
        }
    }

    pub fn as_normalized_str(&self) -> Option<&str> {
        match self {
            Self::NormalizedString(value) => Some(value.as_str()),
            _ => None,
        }
    }
}

/// One step of an exploration as seen by the player screen.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EphemeralState {
    #[serde(default)]
    pub state_name: String,
    #[serde(default)]
    pub interaction_kind: String,
    #[serde(default)]
    pub customization_args: CustomizationArgs,
}

impl EphemeralState {
    pub fn new(state_name: impl Into<String>, interaction_kind: impl Into<String>) -> Self {
        Self {
            state_name: state_name.into(),
            interaction_kind: interaction_kind.into(),
            customization_args: CustomizationArgs::new(),
        }
    }

    pub fn with_arg(mut self, key: impl Into<String>, value: CustomizationValue) -> Self {
        self.customization_args.insert(key.into(), value);
        self
    }

    /// Looks up a string customization arg for this step's interaction.
    pub fn normalized_string_arg(&self, key: &str) -> Result<&str, CustomizationArgError> {
        let value =
            self.customization_args
                .get(key)
                .ok_or_else(|| CustomizationArgError::Missing {
                    kind: self.interaction_kind.clone(),
                    key: key.to_string(),
                })?;

        value
            .as_normalized_str()
            .ok_or_else(|| CustomizationArgError::WrongType {
                kind: self.interaction_kind.clone(),
                key: key.to_string(),
                expected: "normalized_string",
                found: value.type_name(),
            })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferenceSnapshot {
    pub dialog_suppressed: bool,
    pub cellular_data_allowed: bool,
}

impl PreferenceSnapshot {
    pub const ALWAYS_ALLOW: Self = Self {
        dialog_suppressed: true,
        cellular_data_allowed: true,
    };

    pub const NEVER_ALLOW: Self = Self {
        dialog_suppressed: true,
        cellular_data_allowed: false,
    };
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionAnswer {
    pub normalized_string: String,
}

impl InteractionAnswer {
    pub fn normalized(value: impl Into<String>) -> Self {
        Self {
            normalized_string: value.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_present_string_arg() {
        let state = EphemeralState::new("Intro", "NumericInput").with_arg(
            "placeholder",
            CustomizationValue::NormalizedString("Enter a number".into()),
        );
        assert_eq!(
            state.normalized_string_arg("placeholder"),
            Ok("Enter a number")
        );
    }

    #[test]
    fn reports_missing_and_mistyped_args() {
        let state = EphemeralState::new("Intro", "NumericInput")
            .with_arg("rows", CustomizationValue::NonNegativeInt(2));

        assert_eq!(
            state.normalized_string_arg("placeholder"),
            Err(CustomizationArgError::Missing {
                kind: "NumericInput".into(),
                key: "placeholder".into(),
            })
        );
        assert_eq!(
            state.normalized_string_arg("rows"),
            Err(CustomizationArgError::WrongType {
                kind: "NumericInput".into(),
                key: "rows".into(),
                expected: "normalized_string",
                found: "non_negative_int",
            })
        );
    }

    #[test]
    fn deserializes_state_with_missing_fields() {
        let state: EphemeralState = serde_json::from_str(
            r#"{"interaction_kind":"NumericInput","customization_args":{"placeholder":{"normalized_string":"0.5"}}}"#,
        )
        .expect("state json");
        assert_eq!(state.state_name, "");
        assert_eq!(
            state.customization_args.get("placeholder"),
            Some(&CustomizationValue::NormalizedString("0.5".into()))
        );
    }
}
