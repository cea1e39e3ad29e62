//! Result ordering for the memory backend
//!
//! Stable multi-key sort over resolved field values. Missing or unknown
//! values sort last ascending and first descending, matching the SQL
//! backend's `ASC NULLS LAST` / `DESC NULLS FIRST` emission.

use std::cmp::Ordering;

use serde_json::Value as Json;

use crate::ast::{Direction, OrderKey, Value};

use super::record::{resolve_path, FieldValue};

/// Sorts records in place by the given keys, in declared order.
pub fn sort_records(records: &mut Vec<Json>, order_by: &[OrderKey]) {
    if order_by.is_empty() {
        return;
    }

    // Precompute sort keys so each record resolves its paths once.
    let mut keyed: Vec<(Vec<Option<Value>>, Json)> = std::mem::take(records)
        .into_iter()
        .map(|record| {
            let keys = order_by
                .iter()
                .map(|key| match resolve_path(&record, &key.path) {
                    FieldValue::Present(value) => Some(value),
                    FieldValue::Missing => None,
                })
                .collect();
            (keys, record)
        })
        .collect();

    keyed.sort_by(|(a_keys, _), (b_keys, _)| {
        for (index, key) in order_by.iter().enumerate() {
            let ordering = compare_keys(&a_keys[index], &b_keys[index], key.direction);
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });

    *records = keyed.into_iter().map(|(_, record)| record).collect();
}

fn compare_keys(a: &Option<Value>, b: &Option<Value>, direction: Direction) -> Ordering {
    // Missing is treated as the greatest value; reversing for DESC then
    // puts it first, mirroring NULLS LAST / NULLS FIRST.
    let ordering = match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => a.sort_cmp(b),
    };
    match direction {
        Direction::Asc => ordering,
        Direction::Desc => ordering.reverse(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ids(records: &[Json]) -> Vec<i64> {
        records
            .iter()
            .map(|r| r.get("id").and_then(Json::as_i64).unwrap())
            .collect()
    }

    #[test]
    fn test_single_key_ascending() {
        let mut records = vec![
            json!({"id": 1, "age": 30}),
            json!({"id": 2, "age": 20}),
            json!({"id": 3, "age": 25}),
        ];
        sort_records(&mut records, &[OrderKey::asc("age")]);
        assert_eq!(ids(&records), vec![2, 3, 1]);
    }

    #[test]
    fn test_single_key_descending() {
        let mut records = vec![
            json!({"id": 1, "age": 30}),
            json!({"id": 2, "age": 20}),
            json!({"id": 3, "age": 25}),
        ];
        sort_records(&mut records, &[OrderKey::desc("age")]);
        assert_eq!(ids(&records), vec![1, 3, 2]);
    }

    #[test]
    fn test_multi_key() {
        let mut records = vec![
            json!({"id": 1, "group": "b", "rank": 1}),
            json!({"id": 2, "group": "a", "rank": 2}),
            json!({"id": 3, "group": "a", "rank": 1}),
        ];
        sort_records(&mut records, &[OrderKey::asc("group"), OrderKey::desc("rank")]);
        assert_eq!(ids(&records), vec![2, 3, 1]);
    }

    #[test]
    fn test_missing_sorts_last_asc_first_desc() {
        let mut records = vec![
            json!({"id": 1}),
            json!({"id": 2, "age": 20}),
            json!({"id": 3, "age": 30}),
        ];
        sort_records(&mut records, &[OrderKey::asc("age")]);
        assert_eq!(ids(&records), vec![2, 3, 1]);

        let mut records = vec![
            json!({"id": 1}),
            json!({"id": 2, "age": 20}),
            json!({"id": 3, "age": 30}),
        ];
        sort_records(&mut records, &[OrderKey::desc("age")]);
        assert_eq!(ids(&records), vec![1, 3, 2]);
    }

    #[test]
    fn test_sort_is_stable() {
        let mut records = vec![
            json!({"id": 1, "age": 25}),
            json!({"id": 2, "age": 25}),
            json!({"id": 3, "age": 25}),
        ];
        sort_records(&mut records, &[OrderKey::asc("age")]);
        assert_eq!(ids(&records), vec![1, 2, 3]);
    }

    #[test]
    fn test_date_strings_sort_lexicographically() {
        let mut records = vec![
            json!({"id": 1, "created": "2024-03-02"}),
            json!({"id": 2, "created": "2024-06-01"}),
            json!({"id": 3, "created": "2024-05-01"}),
        ];
        sort_records(&mut records, &[OrderKey::desc("created")]);
        assert_eq!(ids(&records), vec![2, 3, 1]);
    }
}
