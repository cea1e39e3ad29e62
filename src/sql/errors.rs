//! SQL backend error types

use thiserror::Error;

/// Error type surfaced by the caller-owned session.
pub type SessionError = Box<dyn std::error::Error + Send + Sync>;

/// Result type for SQL translation and execution.
pub type BackendResult<T> = Result<T, BackendError>;

/// Failures in the SQL backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The translator could not emit SQL for an operator/value pairing.
    #[error("cannot translate operator '{operator}': {detail}")]
    TranslationFailed { operator: String, detail: String },

    /// The underlying store failed; the cause is passed through verbatim.
    #[error("execution failed: {0}")]
    ExecutionFailed(#[source] SessionError),
}

impl BackendError {
    pub fn translation(operator: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::TranslationFailed {
            operator: operator.into(),
            detail: detail.into(),
        }
    }
}
