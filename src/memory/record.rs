//! Field path resolution over JSON records
//!
//! Resolves dotted paths against `serde_json::Value` records with
//! existential list traversal: when a segment lands on an array and the
//! next segment is not an index, the remaining path applies to every
//! element and the resolved value is the list of hits. Absent segments
//! resolve to `Missing`, which the operators treat like SQL NULL.

use serde_json::Value as Json;

use crate::ast::{FieldPath, Value};

/// A resolved field: absent, or a value converted to the condition domain.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Missing,
    Present(Value),
}

impl FieldValue {
    pub fn is_missing(&self) -> bool {
        matches!(self, FieldValue::Missing)
    }
}

/// Resolves a dotted path on a record.
pub fn resolve_path(record: &Json, path: &FieldPath) -> FieldValue {
    let segments: Vec<&str> = path.segments().collect();
    match resolve_segments(record, &segments) {
        Some(json) => FieldValue::Present(Value::from_json(json)),
        None => FieldValue::Missing,
    }
}

fn resolve_segments(current: &Json, segments: &[&str]) -> Option<Json> {
    let Some((segment, remaining)) = segments.split_first() else {
        return Some(current.clone());
    };

    match current {
        Json::Object(map) => map
            .get(*segment)
            .and_then(|next| resolve_segments(next, remaining)),
        Json::Array(items) => {
            // Explicit numeric index wins; otherwise traverse every element.
            if let Ok(index) = segment.parse::<usize>() {
                if let Some(next) = items.get(index) {
                    return resolve_segments(next, remaining);
                }
            }
            let hits: Vec<Json> = items
                .iter()
                .filter_map(|item| resolve_segments(item, segments))
                .collect();
            if hits.is_empty() {
                None
            } else {
                Some(Json::Array(hits))
            }
        }
        _ => None,
    }
}

/// True when at least one record shape can satisfy the path.
pub fn has_path(record: &Json, path: &FieldPath) -> bool {
    let segments: Vec<&str> = path.segments().collect();
    has_segments(record, &segments)
}

fn has_segments(current: &Json, segments: &[&str]) -> bool {
    let Some((segment, remaining)) = segments.split_first() else {
        return true;
    };

    match current {
        Json::Object(map) => map
            .get(*segment)
            .map(|next| has_segments(next, remaining))
            .unwrap_or(false),
        Json::Array(items) => {
            if let Ok(index) = segment.parse::<usize>() {
                if let Some(next) = items.get(index) {
                    return has_segments(next, remaining);
                }
            }
            items.iter().any(|item| has_segments(item, segments))
        }
        _ => false,
    }
}

/// Attribute names at the first unresolvable step of a path, for error
/// suggestions. Walks as far as the record allows, then reports the keys
/// available where resolution stopped.
pub fn sibling_names(record: &Json, path: &FieldPath) -> (String, Vec<String>) {
    let mut current = record;
    let mut failed = path.segments().next().unwrap_or_default().to_string();

    for segment in path.segments() {
        failed = segment.to_string();
        let next = match current {
            Json::Object(map) => map.get(segment),
            Json::Array(items) => items.first().and_then(|item| match item {
                Json::Object(map) => map.get(segment),
                _ => None,
            }),
            _ => None,
        };
        match next {
            Some(value) => current = value,
            None => break,
        }
    }

    let names = match current {
        Json::Object(map) => map.keys().cloned().collect(),
        Json::Array(items) => match items.first() {
            Some(Json::Object(map)) => map.keys().cloned().collect(),
            _ => Vec::new(),
        },
        _ => Vec::new(),
    };
    (failed, names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_simple_lookup() {
        let record = json!({"status": "active"});
        assert_eq!(
            resolve_path(&record, &"status".into()),
            FieldValue::Present(Value::String("active".into()))
        );
    }

    #[test]
    fn test_nested_lookup() {
        let record = json!({"address": {"city": "NY"}});
        assert_eq!(
            resolve_path(&record, &"address.city".into()),
            FieldValue::Present(Value::String("NY".into()))
        );
    }

    #[test]
    fn test_missing_segment() {
        let record = json!({"status": "active"});
        assert_eq!(resolve_path(&record, &"missing".into()), FieldValue::Missing);
        assert_eq!(
            resolve_path(&record, &"status.deeper".into()),
            FieldValue::Missing
        );
    }

    #[test]
    fn test_implicit_list_traversal() {
        let record = json!({"users": [{"name": "Alice"}, {"name": "Bob"}]});
        assert_eq!(
            resolve_path(&record, &"users.name".into()),
            FieldValue::Present(Value::List(vec![
                Value::String("Alice".into()),
                Value::String("Bob".into())
            ]))
        );
    }

    #[test]
    fn test_numeric_index() {
        let record = json!({"items": [{"name": "first"}, {"name": "second"}]});
        assert_eq!(
            resolve_path(&record, &"items.1.name".into()),
            FieldValue::Present(Value::String("second".into()))
        );
    }

    #[test]
    fn test_traversal_skips_nonmatching_elements() {
        let record = json!({"users": [{"name": "Alice"}, {"id": 2}]});
        assert_eq!(
            resolve_path(&record, &"users.name".into()),
            FieldValue::Present(Value::List(vec![Value::String("Alice".into())]))
        );
    }

    #[test]
    fn test_has_path() {
        let record = json!({"users": [{"name": "Alice"}], "age": null});
        assert!(has_path(&record, &"users.name".into()));
        assert!(has_path(&record, &"age".into()));
        assert!(!has_path(&record, &"users.email".into()));
    }

    #[test]
    fn test_sibling_names_at_failure_point() {
        let record = json!({"profile": {"city": "NY", "zip": "10001"}});
        let (failed, names) = sibling_names(&record, &"profile.cty".into());
        assert_eq!(failed, "cty");
        assert!(names.contains(&"city".to_string()));
    }
}
