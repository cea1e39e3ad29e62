//! Crate-level error type
//!
//! Unifies the failure families: validation and resolution abort before
//! any execution; backend errors wrap the underlying store's failure
//! verbatim; runtime errors come from in-memory evaluation only.

use thiserror::Error;

use crate::memory::MemoryError;
use crate::resolver::ResolutionError;
use crate::sql::BackendError;
use crate::validator::ValidationError;

/// Result type for the public entry points.
pub type SearchResult<T> = Result<T, SearchError>;

/// Any failure surfaced by a search.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Query structure or operator-set violation
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Field path did not resolve against the schema or records
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    /// SQL translation or execution failure
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// Runtime failure during in-memory evaluation
    #[error(transparent)]
    Runtime(#[from] MemoryError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_wraps_transparently() {
        let inner = ValidationError::InvalidNot { arity: 2 };
        let outer = SearchError::from(inner.clone());
        assert_eq!(outer.to_string(), inner.to_string());
    }

    #[test]
    fn test_runtime_error_wraps_transparently() {
        let inner = MemoryError::InvalidRegex {
            pattern: "(".into(),
            detail: "unclosed group".into(),
        };
        let outer = SearchError::from(inner.clone());
        assert_eq!(outer.to_string(), inner.to_string());
    }
}
