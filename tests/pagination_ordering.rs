//! Pagination and Ordering Tests
//!
//! Ordering determinism, missing-value placement, stable multi-key sorts,
//! and paging composition: a prefix of limit n+m equals limit n followed
//! by limit m at offset n when the ordering is total.

use searchql::ast::{Query, QueryBuilder};
use searchql::dispatch::{search, Source};
use serde_json::json;

// =============================================================================
// Helper Functions
// =============================================================================

fn people() -> Vec<serde_json::Value> {
    vec![
        json!({"id": 1, "name": "Dana", "age": 41}),
        json!({"id": 2, "name": "Alice", "age": 35}),
        json!({"id": 3, "name": "Carol", "age": 35}),
        json!({"id": 4, "name": "Bob"}),
        json!({"id": 5, "name": "Erin", "age": 28}),
    ]
}

async fn run(query: &Query) -> Vec<i64> {
    search(query, Source::Records(people()))
        .await
        .unwrap()
        .iter()
        .map(|r| r["id"].as_i64().unwrap())
        .collect()
}

// =============================================================================
// Ordering
// =============================================================================

#[tokio::test]
async fn test_ascending_order_missing_last() {
    let query = QueryBuilder::new().order_by(["age"]).build();
    assert_eq!(run(&query).await, vec![5, 2, 3, 1, 4]);
}

#[tokio::test]
async fn test_descending_order_missing_first() {
    let query = QueryBuilder::new().order_by(["-age"]).build();
    assert_eq!(run(&query).await, vec![4, 1, 2, 3, 5]);
}

#[tokio::test]
async fn test_multi_key_tiebreak() {
    let query = QueryBuilder::new().order_by(["age", "-name"]).build();
    // Ties on age=35 break by name descending: Carol before Alice.
    assert_eq!(run(&query).await, vec![5, 3, 2, 1, 4]);
}

/// Same input, same ordering keys, same sequence, every time.
#[tokio::test]
async fn test_ordering_determinism() {
    let query = QueryBuilder::new().order_by(["age", "name"]).build();
    let first = run(&query).await;
    for _ in 0..20 {
        assert_eq!(run(&query).await, first);
    }
}

/// Equal keys keep source order.
#[tokio::test]
async fn test_sort_stability() {
    let query = QueryBuilder::new().order_by(["age"]).build();
    let ids = run(&query).await;
    // Alice (2) appears before Carol (3): both age 35, input order kept.
    let alice = ids.iter().position(|&id| id == 2).unwrap();
    let carol = ids.iter().position(|&id| id == 3).unwrap();
    assert!(alice < carol);
}

// =============================================================================
// Paging
// =============================================================================

#[tokio::test]
async fn test_offset_skips_before_limit() {
    let query = QueryBuilder::new().order_by(["id"]).offset(2).limit(2).build();
    assert_eq!(run(&query).await, vec![3, 4]);
}

#[tokio::test]
async fn test_offset_past_end() {
    let query = QueryBuilder::new().order_by(["id"]).offset(100).build();
    assert_eq!(run(&query).await, Vec::<i64>::new());
}

#[tokio::test]
async fn test_limit_zero_yields_nothing() {
    let query = QueryBuilder::new().order_by(["id"]).limit(0).build();
    assert_eq!(run(&query).await, Vec::<i64>::new());
}

/// search(limit n+m) == search(limit n) ++ search(limit m, offset n)
/// under a total ordering.
#[tokio::test]
async fn test_paging_composition() {
    for (n, m) in [(1, 2), (2, 2), (3, 1), (0, 4)] {
        let whole = QueryBuilder::new()
            .order_by(["id"])
            .limit(n + m)
            .build();
        let head = QueryBuilder::new().order_by(["id"]).limit(n).build();
        let tail = QueryBuilder::new()
            .order_by(["id"])
            .limit(m)
            .offset(n)
            .build();

        let mut combined = run(&head).await;
        combined.extend(run(&tail).await);
        assert_eq!(run(&whole).await, combined, "n={n} m={m}");
    }
}
