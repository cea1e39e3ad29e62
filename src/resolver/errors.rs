//! Path resolution error types

use thiserror::Error;

/// Result type for path resolution.
pub type ResolutionResult<T> = Result<T, ResolutionError>;

/// Failures while resolving a dotted field path against a schema.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ResolutionError {
    /// Segment names neither a column nor a relation, and no hook claimed it.
    #[error("unknown field '{segment}' on model '{model}' (path '{path}'){}", suggestion_suffix(.suggestion))]
    UnknownField {
        path: String,
        segment: String,
        model: String,
        suggestion: Option<String>,
    },

    /// Path terminates on something that is not a scalar column, or tries
    /// to traverse through one.
    #[error("invalid leaf for path '{path}': {reason}")]
    InvalidLeaf { path: String, reason: String },

    /// Model registered under more than one matching relation name.
    #[error("relation reference '{path}' is ambiguous")]
    AmbiguousRelation { path: String },

    /// Root model missing from the schema.
    #[error("unknown model '{model}'")]
    UnknownModel { model: String },
}

fn suggestion_suffix(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(s) => format!(", did you mean '{s}'?"),
        None => String::new(),
    }
}
