//! Backend dispatch
//!
//! Uniform entry points over both backends. The source operand picks the
//! backend: record collections and record streams evaluate in memory
//! (any `model` is irrelevant there), a database session translates to
//! SQL against its root model. The operator subset permitted by the
//! chosen backend is enforced by validation before anything executes.

use std::sync::Arc;

use futures::stream::{self, BoxStream, StreamExt};
use serde_json::Value as Json;
use tracing::debug;

use crate::ast::Query;
use crate::error::SearchError;
use crate::memory::MemoryBackend;
use crate::resolver::{ResolveHook, SchemaIntrospector};
use crate::sql::{Row, Session, SqlBackend};

/// A database source: caller-owned session, schema, and root model.
pub struct SqlSource<'a> {
    pub session: &'a mut dyn Session,
    pub schema: &'a dyn SchemaIntrospector,
    pub model: &'a str,
}

/// The operand a search runs against.
pub enum Source<'a> {
    /// A single record
    Record(Json),
    /// A materialized record collection
    Records(Vec<Json>),
    /// An asynchronous record stream
    Stream(BoxStream<'a, Json>),
    /// A relational database
    Sql(SqlSource<'a>),
}

/// Configured search entry point.
///
/// Hooks apply to SQL translation; strict field checking applies to the
/// memory backend. Both default off.
#[derive(Default)]
pub struct Searcher {
    hooks: Vec<Arc<dyn ResolveHook>>,
    strict_fields: bool,
}

impl Searcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hooks(mut self, hooks: Vec<Arc<dyn ResolveHook>>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn with_strict_fields(mut self, strict_fields: bool) -> Self {
        self.strict_fields = strict_fields;
        self
    }

    /// Runs the query against the source, materializing results.
    pub async fn search(&self, query: &Query, source: Source<'_>) -> Result<Vec<Row>, SearchError> {
        match source {
            Source::Record(record) => {
                debug!(backend = "memory", "dispatching search");
                self.memory().search(query, vec![record]).await
            }
            Source::Records(records) => {
                debug!(backend = "memory", records = records.len(), "dispatching search");
                self.memory().search(query, records).await
            }
            Source::Stream(records) => {
                debug!(backend = "memory", "dispatching search over stream");
                let buffered: Vec<Json> = records.collect().await;
                self.memory().search(query, buffered).await
            }
            Source::Sql(sql) => {
                debug!(backend = "sql", model = sql.model, "dispatching search");
                SqlBackend::new(sql.schema)
                    .with_hooks(self.hooks.clone())
                    .execute_all(query, sql.model, sql.session)
                    .await
            }
        }
    }

    /// Runs the query against the source, yielding results lazily.
    pub async fn search_stream<'a>(
        &self,
        query: &Query,
        source: Source<'a>,
    ) -> Result<BoxStream<'a, Result<Row, SearchError>>, SearchError> {
        match source {
            Source::Record(record) => {
                self.memory()
                    .search_stream(query, stream::iter([record]).boxed())
                    .await
            }
            Source::Records(records) => {
                self.memory()
                    .search_stream(query, stream::iter(records).boxed())
                    .await
            }
            Source::Stream(records) => self.memory().search_stream(query, records).await,
            Source::Sql(sql) => {
                SqlBackend::new(sql.schema)
                    .with_hooks(self.hooks.clone())
                    .execute_stream(query, sql.model, sql.session)
                    .await
            }
        }
    }

    fn memory(&self) -> MemoryBackend {
        MemoryBackend::new().with_strict_fields(self.strict_fields)
    }
}

/// Searches with default configuration. See [`Searcher`] for hooks and
/// strict field checking.
pub async fn search(query: &Query, source: Source<'_>) -> Result<Vec<Row>, SearchError> {
    Searcher::new().search(query, source).await
}

/// Streaming variant of [`search`].
pub async fn search_stream<'a>(
    query: &Query,
    source: Source<'a>,
) -> Result<BoxStream<'a, Result<Row, SearchError>>, SearchError> {
    Searcher::new().search_stream(query, source).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::QueryBuilder;
    use serde_json::json;

    #[tokio::test]
    async fn test_records_dispatch_to_memory() {
        let query = QueryBuilder::new().condition("status", "=", "active").build();
        let records = vec![
            json!({"id": 1, "status": "active"}),
            json!({"id": 2, "status": "closed"}),
        ];

        let results = search(&query, Source::Records(records)).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0]["id"], 1);
    }

    #[tokio::test]
    async fn test_single_record_dispatch() {
        let query = QueryBuilder::new().condition("status", "=", "active").build();
        let results = search(&query, Source::Record(json!({"status": "active"})))
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn test_sql_only_operator_rejected_for_memory_source() {
        let query = QueryBuilder::new().condition("body", "fts", "terms").build();
        let result = search(&query, Source::Records(vec![json!({"body": "x"})])).await;
        assert!(matches!(result, Err(SearchError::Validation(_))));
    }

    #[tokio::test]
    async fn test_stream_source_search_stream() {
        let query = QueryBuilder::new().condition("n", ">", 1).build();
        let source = stream::iter(vec![json!({"n": 1}), json!({"n": 2}), json!({"n": 3})]);

        let results: Vec<_> = search_stream(&query, Source::Stream(source.boxed()))
            .await
            .unwrap()
            .collect()
            .await;

        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.is_ok()));
    }
}
