//! String operator emission
//!
//! LIKE variants keep the user's wildcards; the contains/startswith/
//! endswith family wraps the bound parameter with `||` concatenation so
//! the needle itself still travels as a parameter. Regex matching uses
//! the PostgreSQL `~` / `~*` operators.

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

    Ok(match operator {
        Operator::Like => format!("{column} LIKE {placeholder}"),
        Operator::NotLike => format!("{column} NOT LIKE {placeholder}"),
        Operator::Ilike => format!("{column} ILIKE {placeholder}"),
        Operator::Contains => format!("{column} LIKE '%' || {placeholder} || '%'"),
        Operator::Icontains => format!("{column} ILIKE '%' || {placeholder} || '%'"),
        Operator::Startswith => format!("{column} LIKE {placeholder} || '%'"),
        Operator::Istartswith => format!("{column} ILIKE {placeholder} || '%'"),
        Operator::Endswith => format!("{column} LIKE '%' || {placeholder}"),
        Operator::Iendswith => format!("{column} ILIKE '%' || {placeholder}"),
        Operator::Regex => format!("{column} ~ {placeholder}"),
        Operator::Iregex => format!("{column} ~* {placeholder}"),
        other => {
            return Err(BackendError::translation(
                other.as_str(),
                "not a string operator",
            ))
        }
    })
}
