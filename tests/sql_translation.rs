//! SQL Translation Tests
//!
//! Statement shape, alias policy, parameter safety, hook interception,
//! and execution through a mock session.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use searchql::ast::{QueryBuilder, Value};
use searchql::dispatch::{search, Searcher, Source, SqlSource};
use searchql::error::SearchError;
use searchql::resolver::{
    HookResult, ModelDef, ResolutionContext, ResolveHook, Schema,
};
use searchql::sql::{Row, Session, SessionError, SqlBackend, SqlStatement};
use serde_json::json;

// =============================================================================
// Helper Functions
// =============================================================================

fn schema() -> Schema {
    Schema::new()
        .model(
            ModelDef::new("ticket", "tickets")
                .columns(["id", "status", "priority", "created_at", "meta", "area"])
                .relation("profile", "profile", "profile_id", "id"),
        )
        .model(
            ModelDef::new("profile", "profiles")
                .columns(["id", "bio"])
                .relation("address", "address", "address_id", "id"),
        )
        .model(ModelDef::new("address", "addresses").columns(["id", "city", "zip"]))
        .model(
            ModelDef::new("node", "nodes")
                .columns(["id", "name"])
                .relation("parent", "node", "parent_id", "id"),
        )
}

/// Session that records statements and replays canned rows.
struct MockSession {
    rows: Vec<Row>,
    statements: Arc<Mutex<Vec<SqlStatement>>>,
    fail: bool,
}

impl MockSession {
    fn new(rows: Vec<Row>) -> Self {
        Self {
            rows,
            statements: Arc::new(Mutex::new(Vec::new())),
            fail: false,
        }
    }

    fn failing() -> Self {
        Self {
            rows: Vec::new(),
            statements: Arc::new(Mutex::new(Vec::new())),
            fail: true,
        }
    }

    fn last_statement(&self) -> SqlStatement {
        self.statements.lock().unwrap().last().unwrap().clone()
    }
}

#[async_trait]
impl Session for MockSession {
    async fn fetch_all(&mut self, statement: &SqlStatement) -> Result<Vec<Row>, SessionError> {
        self.statements.lock().unwrap().push(statement.clone());
        if self.fail {
            return Err("connection reset".into());
        }
        Ok(self.rows.clone())
    }

    async fn fetch_stream<'a>(
        &'a mut self,
        statement: &SqlStatement,
    ) -> Result<BoxStream<'a, Result<Row, SessionError>>, SessionError> {
        self.statements.lock().unwrap().push(statement.clone());
        if self.fail {
            return Err("connection reset".into());
        }
        Ok(stream::iter(self.rows.clone().into_iter().map(Ok)).boxed())
    }
}

// =============================================================================
// Alias Policy
// =============================================================================

/// Two conditions on the same nested prefix produce one join of each
/// relation, with the alias shared.
#[tokio::test]
async fn test_alias_reuse_for_shared_prefix() {
    let query = QueryBuilder::new()
        .condition("profile.address.city", "=", "NY")
        .condition("profile.address.zip", "=", "10001")
        .build();

    let schema = schema();
    let statement = SqlBackend::new(&schema)
        .translate(&query, "ticket")
        .await
        .unwrap();

    assert_eq!(statement.sql.matches("LEFT JOIN profiles").count(), 1);
    assert_eq!(statement.sql.matches("LEFT JOIN addresses").count(), 1);
}

/// Self-referential chains allocate a distinct alias per traversal
/// occurrence.
#[tokio::test]
async fn test_self_referential_distinct_aliases() {
    let query = QueryBuilder::new()
        .condition("parent.name", "=", "A")
        .condition("parent.parent.name", "=", "B")
        .build();

    let schema = schema();
    let statement = SqlBackend::new(&schema)
        .translate(&query, "node")
        .await
        .unwrap();

    assert_eq!(statement.sql.matches("LEFT JOIN nodes AS").count(), 3);
    assert!(statement.sql.contains("nodes_1.name = $1"));
    assert!(statement.sql.contains("nodes_2.name = $2"));
}

// =============================================================================
// Parameter Safety
// =============================================================================

/// No user-supplied scalar ever lands in the SQL text.
#[tokio::test]
async fn test_all_scalars_become_parameters() {
    let hostile = "'; DROP TABLE tickets; --";
    let query = QueryBuilder::new()
        .condition("status", "=", hostile)
        .condition("status", "like", "%payload%")
        .condition("priority", "in", vec![666i64, 667i64])
        .condition(
            "area",
            "intersects",
            Value::from_json(json!({"type": "Point", "coordinates": [6.66, 6.67]})),
        )
        .condition(
            "meta",
            "jsonb_contains",
            Value::from_json(json!({"k": "hostile-value"})),
        )
        .limit(13)
        .offset(7)
        .build();

    let schema = schema();
    let statement = SqlBackend::new(&schema)
        .translate(&query, "ticket")
        .await
        .unwrap();

    assert!(!statement.sql.contains("DROP TABLE"));
    assert!(!statement.sql.contains("payload"));
    assert!(!statement.sql.contains("666"));
    assert!(!statement.sql.contains("6.66"));
    assert!(!statement.sql.contains("hostile-value"));
    assert!(!statement.sql.contains("13"));
    // One param per scalar: string, pattern, two list elements, geometry,
    // jsonb document, limit, offset.
    assert_eq!(statement.params.len(), 8);
}

// =============================================================================
// Hooks
// =============================================================================

struct TagFragmentHook;

#[async_trait]
impl ResolveHook for TagFragmentHook {
    async fn resolve(&self, ctx: ResolutionContext<'_>) -> Option<HookResult> {
        if ctx.attribute != "tag" {
            return None;
        }
        Some(HookResult::Fragment {
            sql: format!(
                "EXISTS (SELECT 1 FROM tag_links WHERE tag_links.ticket_id = {}.id \
                 AND tag_links.tag = ?)",
                ctx.parent_alias
            ),
            params: vec![Value::String("rust".into())],
        })
    }
}

/// Hook fragments are spliced verbatim with their parameters rebound.
#[tokio::test]
async fn test_hook_fragment_insertion() {
    let query = QueryBuilder::new()
        .condition("status", "=", "active")
        .condition("tag", "=", "ignored")
        .build();

    let schema = schema();
    let statement = SqlBackend::new(&schema)
        .with_hooks(vec![Arc::new(TagFragmentHook)])
        .translate(&query, "ticket")
        .await
        .unwrap();

    assert!(statement.sql.contains("EXISTS (SELECT 1 FROM tag_links"));
    assert!(statement.sql.contains("tag_links.tag = $2"));
    assert_eq!(statement.params[1], Value::String("rust".into()));
}

// =============================================================================
// Execution
// =============================================================================

#[tokio::test]
async fn test_execute_all_through_dispatcher() {
    let query = QueryBuilder::new().condition("status", "=", "active").build();
    let schema = schema();
    let mut session = MockSession::new(vec![
        json!({"id": 1, "status": "active"}),
        json!({"id": 2, "status": "active"}),
    ]);

    let results = search(
        &query,
        Source::Sql(SqlSource {
            session: &mut session,
            schema: &schema,
            model: "ticket",
        }),
    )
    .await
    .unwrap();

    assert_eq!(results.len(), 2);
    let statement = session.last_statement();
    assert!(statement.sql.starts_with("SELECT tickets.* FROM tickets"));
    assert_eq!(statement.params, vec![Value::String("active".into())]);
}

#[tokio::test]
async fn test_execute_stream_yields_rows() {
    let query = QueryBuilder::new().condition("status", "=", "active").build();
    let schema = schema();
    let mut session = MockSession::new(vec![json!({"id": 1}), json!({"id": 2})]);

    let results: Vec<_> = Searcher::new()
        .search_stream(
            &query,
            Source::Sql(SqlSource {
                session: &mut session,
                schema: &schema,
                model: "ticket",
            }),
        )
        .await
        .unwrap()
        .collect()
        .await;

    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| r.is_ok()));
}

/// Store failures come back wrapped, cause preserved.
#[tokio::test]
async fn test_execution_failure_wrapped() {
    let query = QueryBuilder::new().condition("status", "=", "active").build();
    let schema = schema();
    let mut session = MockSession::failing();

    let result = SqlBackend::new(&schema)
        .execute_all(&query, "ticket", &mut session)
        .await;

    match result {
        Err(SearchError::Backend(error)) => {
            assert!(error.to_string().contains("connection reset"));
        }
        other => panic!("expected backend error, got {other:?}"),
    }
}

// =============================================================================
// Resolution Failures
// =============================================================================

#[tokio::test]
async fn test_unknown_field_suggestion() {
    let query = QueryBuilder::new().condition("priorty", "=", 1).build();
    let schema = schema();
    let result = SqlBackend::new(&schema).translate(&query, "ticket").await;

    match result {
        Err(SearchError::Resolution(error)) => {
            let text = error.to_string();
            assert!(text.contains("priorty"));
            assert!(text.contains("priority"));
        }
        other => panic!("expected resolution error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_relation_terminal_rejected() {
    let query = QueryBuilder::new().condition("profile", "=", 1).build();
    let schema = schema();
    let result = SqlBackend::new(&schema).translate(&query, "ticket").await;
    assert!(matches!(result, Err(SearchError::Resolution(_))));
}

#[tokio::test]
async fn test_order_by_resolves_through_joins() {
    let query = QueryBuilder::new()
        .condition("status", "=", "active")
        .order_by(["profile.address.city"])
        .build();

    let schema = schema();
    let statement = SqlBackend::new(&schema)
        .translate(&query, "ticket")
        .await
        .unwrap();

    assert!(statement.sql.contains("LEFT JOIN addresses"));
    assert!(statement
        .sql
        .contains("ORDER BY addresses_2.city ASC NULLS LAST"));
}
