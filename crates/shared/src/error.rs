use thiserror::Error;

/// Failure delivered by one of the asynchronous data sources.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("{source_name} fetch failed: {message}")]
    Transient {
        source_name: String,
        message: String,
    },
}

impl FetchError {
    pub fn transient(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transient {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    pub fn source_name(&self) -> &str {
        match self {
            Self::Transient { source_name, .. } => source_name,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Transient { message, .. } => message,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CustomizationArgError {
    #[error("{kind} interaction is missing customization arg '{key}'")]
    Missing { kind: String, key: String },
    #[error("{kind} customization arg '{key}' is {found}, expected {expected}")]
    WrongType {
        kind: String,
        key: String,
        expected: &'static str,
        found: &'static str,
    },
}

impl CustomizationArgError {
    pub fn key(&self) -> &str {
        match self {
            Self::Missing { key, .. } | Self::WrongType { key, .. } => key,
        }
    }
}
