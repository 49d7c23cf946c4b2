//! Chat model invocation errors.

use thiserror::Error;

/// Failure reported by a [`ChatModel`](crate::model::ChatModel).
///
/// Steps do not catch these; they propagate to the graph's caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("Model invocation failed: {message}")]
    Invocation { message: String },

    #[error("Model returned an invalid response: {message}")]
    InvalidResponse { message: String },
}

impl ModelError {
    pub fn invocation(message: impl Into<String>) -> Self {
        ModelError::Invocation {
            message: message.into(),
        }
    }
}

/// Result type alias for model calls.
pub type ModelResult<T> = Result<T, ModelError>;
