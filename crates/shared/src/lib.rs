pub mod async_result;
pub mod domain;
pub mod error;
pub mod protocol;

pub use async_result::{AsyncResult, ResultStream};
