//! Set operator emission
//!
//! Membership expands to one placeholder per element. An empty membership
//! list degenerates to a constant predicate rather than invalid SQL.
//! `all` emits array containment: the column's array must be a subset of
//! the listed values.

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
        Operator::In | Operator::NotIn => {
            let items = expect_list(operator, value)?;
            if items.is_empty() {
                return Ok(match operator {
                    Operator::In => "FALSE".to_string(),
                    _ => "TRUE".to_string(),
                });
            }
            let placeholders = bind_all(items, params);
            let keyword = if operator == Operator::In {
                "IN"
            } else {
                "NOT IN"
            };
            Ok(format!("{column} {keyword} ({placeholders})"))
        }
        Operator::All => {
            let items = expect_list(operator, value)?;
            if items.is_empty() {
                // Only an empty array is a subset of the empty set.
                return Ok(format!("{column} = ARRAY[]::text[]"));
            }
            let placeholders = bind_all(items, params);
            Ok(format!("{column} <@ ARRAY[{placeholders}]"))
        }
        Operator::Between | Operator::NotBetween => {
            let (low, high) = value.as_range().ok_or_else(|| {
                BackendError::translation(operator.as_str(), "expected a [low, high] pair")
            })?;
            let low = params.bind(low.clone());
            let high = params.bind(high.clone());
            let keyword = if operator == Operator::Between {
                "BETWEEN"
            } else {
                "NOT BETWEEN"
            };
            Ok(format!("{column} {keyword} {low} AND {high}"))
        }
        other => Err(BackendError::translation(
            other.as_str(),
            "not a set operator",
        )),
    }
}

fn expect_list<'a>(operator: Operator, value: &'a Value) -> BackendResult<&'a Vec<Value>> {
    match value {
        Value::List(items) => Ok(items),
        other => Err(BackendError::translation(
            operator.as_str(),
            format!("expected a list, got {}", other.kind()),
        )),
    }
}

fn bind_all(items: &[Value], params: &mut ParamBinder) -> String {
    items
        .iter()
        .map(|item| params.bind(item.clone()))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_in_expands_placeholders() {
        let mut params = ParamBinder::new();
        let value = Value::from_json(json!(["active", "pending"]));
        let sql = emit(Operator::In, "t.status", Some(&value), &mut params).unwrap();
        assert_eq!(sql, "t.status IN ($1, $2)");
        assert_eq!(params.into_params().len(), 2);
    }

    #[test]
    fn test_empty_in_is_constant() {
        let mut params = ParamBinder::new();
        let value = Value::List(Vec::new());
        assert_eq!(
            emit(Operator::In, "t.c", Some(&value), &mut params).unwrap(),
            "FALSE"
        );
        assert_eq!(
            emit(Operator::NotIn, "t.c", Some(&value), &mut params).unwrap(),
            "TRUE"
        );
    }

    #[test]
    fn test_all_emits_array_containment() {
        let mut params = ParamBinder::new();
        let value = Value::from_json(json!(["a", "b", "c"]));
        let sql = emit(Operator::All, "t.tags", Some(&value), &mut params).unwrap();
        assert_eq!(sql, "t.tags <@ ARRAY[$1, $2, $3]");
    }

    #[test]
    fn test_between_binds_both_bounds() {
        let mut params = ParamBinder::new();
        let value = Value::from_json(json!([1, 10]));
        let sql = emit(Operator::Between, "t.age", Some(&value), &mut params).unwrap();
        assert_eq!(sql, "t.age BETWEEN $1 AND $2");

        let sql = emit(Operator::NotBetween, "t.age", Some(&value), &mut params).unwrap();
        assert_eq!(sql, "t.age NOT BETWEEN $3 AND $4");
    }
}
