/// Core error types for FlowPlayer
use thiserror::Error;

/// Result type alias using `FlowError`
pub type Result<T> = std::result::Result<T, FlowError>;

/// Core error type for FlowPlayer
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FlowError {
    /// Unknown Flow color key
    #[error("Unknown flow: {0}")]
    UnknownFlow(String),

    /// Unknown media kind
    #[error("Unknown media kind: {0}")]
    UnknownMediaKind(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl FlowError {
    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}
