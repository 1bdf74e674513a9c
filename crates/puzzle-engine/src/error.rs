//! Error types for sequence production.

use thiserror::Error;

/// Result type alias for sequence operations.
pub type Result<T> = std::result::Result<T, SequenceError>;

/// Errors that can occur while producing sequence values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SequenceError {
    /// A caller-supplied generator reported a failure.
    #[error("generator failed: {reason}")]
    Generator { reason: String },

    /// Forced production ran past the configured maximum index.
    #[error("sequence overflow: production exceeded {limit} values")]
    Overflow { limit: usize },

    /// An inclusive range was requested with its bounds reversed.
    #[error("invalid range: {from} > {to}")]
    InvalidRange { from: i64, to: i64 },
}

impl SequenceError {
    /// Create a generator failure with the given reason.
    pub fn generator(reason: impl Into<String>) -> Self {
        SequenceError::Generator {
            reason: reason.into(),
        }
    }
}
