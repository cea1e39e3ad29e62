//! Full-text search emission
//!
//! PostgreSQL tsvector matching. `fts` uses `plainto_tsquery`,
//! `fts_phrase` uses `phraseto_tsquery` for exact phrase order.

use crate::ast::Value;
use crate::operators::Operator;

use super::super::errors::{BackendError, BackendResult};
use super::super::statement::ParamBinder;
use super::require_value;

pub(crate) fn emit(
    operator: Operator,
    column: &str,
    value: Option<&Value>,
    params: &mut ParamBinder,
) -> BackendResult<String> {
    let value = require_value(operator, value)?;
    let placeholder = params.bind(value.clone());

    match operator {
        Operator::Fts => Ok(format!(
            "to_tsvector({column}) @@ plainto_tsquery({placeholder})"
        )),
        Operator::FtsPhrase => Ok(format!(
            "to_tsvector({column}) @@ phraseto_tsquery({placeholder})"
        )),
        other => Err(BackendError::translation(
            other.as_str(),
            "not a full-text operator",
        )),
    }
}
