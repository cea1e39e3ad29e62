//! JSONB operator emission
//!
//! PostgreSQL containment and key-existence operators. Documents bind as
//! parameters cast to `jsonb`; key lists expand into `ARRAY[...]` with one
//! placeholder per key.

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

    match operator {
        Operator::JsonbContains => {
            let placeholder = params.bind(value.clone());
            Ok(format!("{column} @> {placeholder}::jsonb"))
        }
        Operator::JsonbContainedBy => {
            let placeholder = params.bind(value.clone());
            Ok(format!("{column} <@ {placeholder}::jsonb"))
        }
        Operator::JsonbHasKey => {
            let placeholder = params.bind(value.clone());
            Ok(format!("{column} ? {placeholder}"))
        }
        Operator::JsonbHasAnyKeys | Operator::JsonbHasAllKeys => {
            let keys = match value {
                Value::List(items) => items,
                other => {
                    return Err(BackendError::translation(
                        operator.as_str(),
                        format!("expected a list of keys, got {}", other.kind()),
                    ))
                }
            };
            let placeholders = keys
                .iter()
                .map(|key| params.bind(key.clone()))
                .collect::<Vec<_>>()
                .join(", ");
            let symbol = if operator == Operator::JsonbHasAnyKeys {
                "?|"
            } else {
                "?&"
            };
            Ok(format!("{column} {symbol} ARRAY[{placeholders}]"))
        }
        Operator::JsonbPathExists => {
            let placeholder = params.bind(value.clone());
            Ok(format!("jsonb_path_exists({column}, {placeholder})"))
        }
        other => Err(BackendError::translation(
            other.as_str(),
            "not a jsonb operator",
        )),
    }
}
