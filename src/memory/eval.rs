//! In-memory predicate evaluation
//!
//! Interprets a validated query against one JSON record at a time.
//! Semantics:
//! - `and` of nothing is true, `or` of nothing is false, `not` negates
//! - missing fields compare false; `is_null`/`is_empty` treat missing as null
//! - a list field matches existentially: the condition holds if any element
//!   satisfies it
//! - mixed scalar kinds compare unequal and are never ordered; ordered
//!   operators on structured values are genuine type clashes
//! - regexes (including translated LIKE patterns) compile once per
//!   condition and are cached for the evaluator's lifetime

use std::collections::HashMap;

use regex::Regex;
use serde_json::Value as Json;

use crate::ast::{Condition, Group, GroupOp, Node, Query, Value};
use crate::error::SearchError;
use crate::fuzzy::closest_match;
use crate::operators::Operator;
use crate::resolver::ResolutionError;
use crate::validator::ValidationError;

use super::errors::MemoryError;
use super::record::{has_path, resolve_path, sibling_names, FieldValue};

/// Evaluates query predicates against records.
///
/// One evaluator serves one search invocation; its regex cache is not
/// shared across requests.
pub struct Evaluator {
    regex_cache: HashMap<String, Regex>,
    strict_fields: bool,
}

impl Evaluator {
    pub fn new(strict_fields: bool) -> Self {
        Self {
            regex_cache: HashMap::new(),
            strict_fields,
        }
    }

    /// True when the record satisfies every top-level group.
    pub fn matches(&mut self, query: &Query, record: &Json) -> Result<bool, SearchError> {
        for group in &query.groups {
            if !self.eval_group(group, record)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn eval_group(&mut self, group: &Group, record: &Json) -> Result<bool, SearchError> {
        match group.op {
            GroupOp::And => {
                for child in &group.children {
                    if !self.eval_node(child, record)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            GroupOp::Or => {
                for child in &group.children {
                    if self.eval_node(child, record)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            GroupOp::Not => {
                // Validation pins `not` to exactly one child.
                match group.children.first() {
                    Some(child) => Ok(!self.eval_node(child, record)?),
                    None => Ok(true),
                }
            }
        }
    }

    fn eval_node(&mut self, node: &Node, record: &Json) -> Result<bool, SearchError> {
        match node {
            Node::Group(group) => self.eval_group(group, record),
            Node::Condition(condition) => self.eval_condition(condition, record),
        }
    }

    fn eval_condition(&mut self, condition: &Condition, record: &Json) -> Result<bool, SearchError> {
        let operator = Operator::parse(&condition.operator).ok_or_else(|| {
            ValidationError::UnknownOperator {
                operator: condition.operator.clone(),
                suggestion: Operator::suggest(&condition.operator),
            }
        })?;

        if self.strict_fields && !has_path(record, &condition.field) {
            let (segment, names) = sibling_names(record, &condition.field);
            let suggestion = closest_match(&segment, names.iter().map(String::as_str));
            return Err(ResolutionError::UnknownField {
                path: condition.field.as_str().to_string(),
                segment,
                model: "record".to_string(),
                suggestion,
            }
            .into());
        }

        let field = resolve_path(record, &condition.field);
        self.eval_field(operator, &field, condition.value.as_ref())
    }

    fn eval_field(
        &mut self,
        operator: Operator,
        field: &FieldValue,
        value: Option<&Value>,
    ) -> Result<bool, SearchError> {
        let field = match field {
            FieldValue::Missing => {
                return Ok(matches!(operator, Operator::IsNull | Operator::IsEmpty));
            }
            FieldValue::Present(v) => v,
        };

        match self.eval_value(operator, field, value) {
            Ok(true) => return Ok(true),
            Ok(false) => {}
            // A structured lhs may still match through its elements.
            Err(SearchError::Runtime(MemoryError::TypeMismatch { .. }))
                if matches!(field, Value::List(_)) => {}
            Err(error) => return Err(error),
        }

        if let Value::List(items) = field {
            for item in items {
                match self.eval_value(operator, item, value) {
                    Ok(true) => return Ok(true),
                    Ok(false) => {}
                    Err(SearchError::Runtime(MemoryError::TypeMismatch { .. })) => {}
                    Err(error) => return Err(error),
                }
            }
        }
        Ok(false)
    }

    fn eval_value(
        &mut self,
        operator: Operator,
        field: &Value,
        value: Option<&Value>,
    ) -> Result<bool, SearchError> {
        match operator {
            Operator::IsNull => return Ok(matches!(field, Value::Null)),
            Operator::IsNotNull => return Ok(!matches!(field, Value::Null)),
            Operator::IsEmpty => return Ok(is_empty(field)),
            Operator::IsNotEmpty => return Ok(!is_empty(field)),
            _ => {}
        }

        // Binary operators; validation guarantees the value is present.
        let Some(value) = value else {
            return Ok(false);
        };

        match operator {
            Operator::Eq => Ok(field == value),
            Operator::Ne => Ok(field != value),
            Operator::Gt | Operator::Lt | Operator::Gte | Operator::Lte => {
                self.ordered(operator, field, value)
            }
            Operator::In => Ok(list_contains(value, field)),
            Operator::NotIn => Ok(!list_contains(value, field)),
            Operator::All => match field {
                // Every element of the field list must appear in the value list.
                Value::List(items) => Ok(items.iter().all(|item| list_contains(value, item))),
                scalar => Ok(list_contains(value, scalar)),
            },
            Operator::Between => self.between(operator, field, value),
            Operator::NotBetween => Ok(!self.between(operator, field, value)?),
            Operator::Like => self.like(field, value, false),
            Operator::NotLike => Ok(!self.like(field, value, false)?),
            Operator::Ilike => self.like(field, value, true),
            Operator::Contains => Ok(str_pair(field, value)
                .map(|(f, v)| f.contains(v))
                .unwrap_or(false)),
            Operator::Icontains => Ok(str_pair(field, value)
                .map(|(f, v)| f.to_lowercase().contains(&v.to_lowercase()))
                .unwrap_or(false)),
            Operator::Startswith => Ok(str_pair(field, value)
                .map(|(f, v)| f.starts_with(v))
                .unwrap_or(false)),
            Operator::Istartswith => Ok(str_pair(field, value)
                .map(|(f, v)| f.to_lowercase().starts_with(&v.to_lowercase()))
                .unwrap_or(false)),
            Operator::Endswith => Ok(str_pair(field, value)
                .map(|(f, v)| f.ends_with(v))
                .unwrap_or(false)),
            Operator::Iendswith => Ok(str_pair(field, value)
                .map(|(f, v)| f.to_lowercase().ends_with(&v.to_lowercase()))
                .unwrap_or(false)),
            Operator::Regex => self.regex_match(field, value, false),
            Operator::Iregex => self.regex_match(field, value, true),
            // SQL-only families; validation rejects these for this backend.
            other => Err(ValidationError::OperatorNotSupportedByBackend {
                operator: other.as_str().to_string(),
                backend: crate::operators::Backend::Memory,
            }
            .into()),
        }
    }

    fn ordered(&self, operator: Operator, field: &Value, value: &Value) -> Result<bool, SearchError> {
        if !field.is_scalar() {
            return Err(MemoryError::TypeMismatch {
                operator: operator.as_str().to_string(),
                lhs_kind: field.kind(),
                rhs_kind: value.kind(),
            }
            .into());
        }
        let Some(ordering) = field.partial_cmp(value) else {
            return Ok(false);
        };
        Ok(match operator {
            Operator::Gt => ordering.is_gt(),
            Operator::Lt => ordering.is_lt(),
            Operator::Gte => ordering.is_ge(),
            Operator::Lte => ordering.is_le(),
            _ => false,
        })
    }

    fn between(&self, operator: Operator, field: &Value, value: &Value) -> Result<bool, SearchError> {
        let Some((low, high)) = value.as_range() else {
            return Ok(false);
        };
        if !field.is_scalar() {
            return Err(MemoryError::TypeMismatch {
                operator: operator.as_str().to_string(),
                lhs_kind: field.kind(),
                rhs_kind: value.kind(),
            }
            .into());
        }
        let in_low = field
            .partial_cmp(low)
            .map(|o| !o.is_lt())
            .unwrap_or(false);
        let in_high = field
            .partial_cmp(high)
            .map(|o| !o.is_gt())
            .unwrap_or(false);
        Ok(in_low && in_high)
    }

    fn like(&mut self, field: &Value, value: &Value, case_insensitive: bool) -> Result<bool, SearchError> {
        let (Some(field), Some(pattern)) = (field.as_str(), value.as_str()) else {
            return Ok(false);
        };
        let source = like_to_regex(pattern, case_insensitive);
        let regex = self.cached_regex(&source, pattern)?;
        Ok(regex.is_match(field))
    }

    fn regex_match(
        &mut self,
        field: &Value,
        value: &Value,
        case_insensitive: bool,
    ) -> Result<bool, SearchError> {
        let Some(pattern) = value.as_str() else {
            return Ok(false);
        };
        let source = if case_insensitive {
            format!("(?i){pattern}")
        } else {
            pattern.to_string()
        };
        let Some(field) = field.as_str() else {
            // Still compile so bad patterns surface deterministically.
            self.cached_regex(&source, pattern)?;
            return Ok(false);
        };
        let regex = self.cached_regex(&source, pattern)?;
        Ok(regex.is_match(field))
    }

    fn cached_regex(&mut self, source: &str, shown_pattern: &str) -> Result<&Regex, SearchError> {
        if !self.regex_cache.contains_key(source) {
            let compiled = Regex::new(source).map_err(|error| MemoryError::InvalidRegex {
                pattern: shown_pattern.to_string(),
                detail: error.to_string(),
            })?;
            self.regex_cache.insert(source.to_string(), compiled);
        }
        Ok(&self.regex_cache[source])
    }
}

/// Membership test used by `in`/`not_in`/`all`.
fn list_contains(list: &Value, item: &Value) -> bool {
    match list {
        Value::List(items) => items.iter().any(|candidate| candidate == item),
        _ => false,
    }
}

fn str_pair<'a>(field: &'a Value, value: &'a Value) -> Option<(&'a str, &'a str)> {
    Some((field.as_str()?, value.as_str()?))
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::List(items) => items.is_empty(),
        Value::Json(json) => json.as_object().map(|o| o.is_empty()).unwrap_or(false),
        _ => false,
    }
}

/// Translates SQL LIKE wildcards into an anchored regex.
fn like_to_regex(pattern: &str, case_insensitive: bool) -> String {
    let mut source = String::with_capacity(pattern.len() + 8);
    if case_insensitive {
        source.push_str("(?i)");
    }
    source.push('^');
    for c in pattern.chars() {
        match c {
            '%' => source.push_str(".*"),
            '_' => source.push('.'),
            other => source.push_str(&regex::escape(&other.to_string())),
        }
    }
    source.push('$');
    source
}
