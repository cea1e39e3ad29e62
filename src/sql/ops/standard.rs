//! Comparison operator emission
//!
//! `=`, `!=`, `>`, `<`, `>=`, `<=`. Equality against null lowers to
//! `IS NULL` / `IS NOT NULL`.

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

    if matches!(value, Value::Null) {
        return match operator {
            Operator::Eq => Ok(format!("{column} IS NULL")),
            Operator::Ne => Ok(format!("{column} IS NOT NULL")),
            other => Err(BackendError::translation(
                other.as_str(),
                "null is only comparable with = and !=",
            )),
        };
    }

    let symbol = match operator {
        Operator::Eq => "=",
        Operator::Ne => "<>",
        Operator::Gt => ">",
        Operator::Lt => "<",
        Operator::Gte => ">=",
        Operator::Lte => "<=",
        other => {
            return Err(BackendError::translation(
                other.as_str(),
                "not a comparison operator",
            ))
        }
    };
    let placeholder = params.bind(value.clone());
    Ok(format!("{column} {symbol} {placeholder}"))
}
