//! Memory backend error types

use thiserror::Error;

/// Result type for memory evaluation.
pub type MemoryResult<T> = Result<T, MemoryError>;

/// Runtime failures during in-memory predicate evaluation.
///
/// Type clashes against a missing field value evaluate to false instead of
/// raising; only genuine clashes on present values fail the query.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum MemoryError {
    /// Pattern for `regex`/`iregex` failed to compile.
    #[error("invalid regular expression '{pattern}': {detail}")]
    InvalidRegex { pattern: String, detail: String },

    /// Operator applied to a field value of an incompatible kind.
    #[error("operator '{operator}' cannot compare {lhs_kind} with {rhs_kind}")]
    TypeMismatch {
        operator: String,
        lhs_kind: &'static str,
        rhs_kind: &'static str,
    },
}
