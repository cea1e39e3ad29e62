//! Validation error types
//!
//! Every way a query can be structurally invalid, as one typed enum.
//! Validation is total: any input query either passes or maps to exactly
//! one of these variants.

use thiserror::Error;

use crate::operators::Backend;

/// Result type for validation.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Query structure or operator-set violations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValidationError {
    /// Operator tag not present in the registry.
    #[error("unknown operator '{operator}'{}", suggestion_suffix(.suggestion))]
    UnknownOperator {
        operator: String,
        suggestion: Option<String>,
    },

    /// Operator exists but the chosen backend cannot evaluate it.
    #[error("operator '{operator}' is not supported by the {backend} backend")]
    OperatorNotSupportedByBackend { operator: String, backend: Backend },

    /// Condition value does not match the operator's declared shape.
    #[error("operator '{operator}' expects {expected}, got {got}")]
    ValueShapeMismatch {
        operator: String,
        expected: &'static str,
        got: String,
    },

    /// Group with no children.
    #[error("group at {location} must contain at least one condition")]
    EmptyGroup { location: String },

    /// NOT group with other than exactly one child.
    #[error("'not' group takes exactly one child, got {arity}")]
    InvalidNot { arity: usize },

    /// Negative limit or offset.
    #[error("invalid paging: {message}")]
    InvalidPaging { message: String },

    /// Group nesting deeper than the configured maximum.
    #[error("maximum nesting depth ({max}) exceeded")]
    DepthExceeded { max: usize },

    /// Field path with bad segments or too many of them.
    #[error("malformed field path '{path}': {reason}")]
    MalformedPath { path: String, reason: String },
}

fn suggestion_suffix(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(s) => format!(", did you mean '{s}'?"),
        None => String::new(),
    }
}
