//! Null and emptiness check emission
//!
//! Unary operators; no parameters bound. Emptiness covers NULL plus the
//! empty string, matching the memory backend's treatment of missing
//! values as null.

use crate::operators::Operator;

use super::super::errors::{BackendError, BackendResult};

pub(crate) fn emit(operator: Operator, column: &str) -> BackendResult<String> {
    match operator {
        Operator::IsNull => Ok(format!("{column} IS NULL")),
        Operator::IsNotNull => Ok(format!("{column} IS NOT NULL")),
        Operator::IsEmpty => Ok(format!("({column} IS NULL OR {column}::text = '')")),
        Operator::IsNotEmpty => Ok(format!("({column} IS NOT NULL AND {column}::text <> '')")),
        other => Err(BackendError::translation(
            other.as_str(),
            "not a null-check operator",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_checks() {
        assert_eq!(emit(Operator::IsNull, "t.c").unwrap(), "t.c IS NULL");
        assert_eq!(emit(Operator::IsNotNull, "t.c").unwrap(), "t.c IS NOT NULL");
    }

    #[test]
    fn test_empty_checks() {
        assert_eq!(
            emit(Operator::IsEmpty, "t.c").unwrap(),
            "(t.c IS NULL OR t.c::text = '')"
        );
        assert_eq!(
            emit(Operator::IsNotEmpty, "t.c").unwrap(),
            "(t.c IS NOT NULL AND t.c::text <> '')"
        );
    }
}
