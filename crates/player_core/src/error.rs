use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlayerError {
    #[error("{operation} must run inside a tokio runtime")]
    NoRuntime { operation: &'static str },
    #[error("state screen view was already created")]
    ViewAlreadyCreated,
}
