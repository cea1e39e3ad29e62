//! Memory search backend
//!
//! Filters JSON records against a validated query, then orders and pages
//! the matches. The streaming entry point stays lazy whenever no ordering
//! is requested; with ordering it buffers the filtered set, sorts, and
//! replays.

use futures::future::ready;
use futures::stream::{self, BoxStream, StreamExt};
use serde_json::Value as Json;
use tracing::debug;

use crate::ast::Query;
use crate::error::SearchError;
use crate::operators::Backend;
use crate::validator::QueryValidator;

use super::eval::Evaluator;
use super::sorter::sort_records;

/// In-memory search backend over `serde_json::Value` records.
///
/// ```
/// use searchql::ast::QueryBuilder;
/// use searchql::memory::MemoryBackend;
/// use serde_json::json;
///
/// # futures::executor::block_on(async {
/// let query = QueryBuilder::new().condition("status", "=", "active").build();
/// let records = vec![json!({"status": "active"}), json!({"status": "closed"})];
/// let results = MemoryBackend::new().search(&query, records).await.unwrap();
/// assert_eq!(results.len(), 1);
/// # });
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    strict_fields: bool,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// When enabled, condition paths that no record shape satisfies raise
    /// an unknown-field error instead of evaluating false.
    pub fn with_strict_fields(mut self, strict_fields: bool) -> Self {
        self.strict_fields = strict_fields;
        self
    }

    /// Filters, orders, and pages the records, materializing the result.
    pub async fn search(
        &self,
        query: &Query,
        records: Vec<Json>,
    ) -> Result<Vec<Json>, SearchError> {
        QueryValidator::for_backend(Backend::Memory).validate(query)?;

        let scanned = records.len();
        let mut evaluator = Evaluator::new(self.strict_fields);
        let mut matched = Vec::new();
        for record in records {
            if evaluator.matches(query, &record)? {
                matched.push(record);
            }
        }
        debug!(scanned, matched = matched.len(), "memory search filtered");

        sort_records(&mut matched, &query.order_by);
        Ok(apply_paging(matched, query))
    }

    /// True when a single record satisfies the query.
    pub async fn matches(&self, query: &Query, record: &Json) -> Result<bool, SearchError> {
        QueryValidator::for_backend(Backend::Memory).validate(query)?;
        Evaluator::new(self.strict_fields).matches(query, record)
    }

    /// Streaming search. Without `order_by` the pipeline is fully lazy:
    /// records are filtered and paged as they arrive, and memory stays
    /// constant in the result count. With `order_by` the filtered set is
    /// buffered, sorted, then replayed.
    pub async fn search_stream<'a>(
        &self,
        query: &Query,
        records: BoxStream<'a, Json>,
    ) -> Result<BoxStream<'a, Result<Json, SearchError>>, SearchError> {
        QueryValidator::for_backend(Backend::Memory).validate(query)?;

        if !query.order_by.is_empty() {
            let buffered: Vec<Json> = records.collect().await;
            let results = self.search(query, buffered).await?;
            return Ok(stream::iter(results.into_iter().map(Ok)).boxed());
        }

        let offset = clamp(query.offset);
        let limit = query.limit.map(|l| l.max(0) as usize);
        let query = query.clone();
        let mut evaluator = Evaluator::new(self.strict_fields);

        let filtered = records.filter_map(move |record| {
            let item = match evaluator.matches(&query, &record) {
                Ok(true) => Some(Ok(record)),
                Ok(false) => None,
                Err(error) => Some(Err(error)),
            };
            ready(item)
        });

        // Offset and limit count matches only; an error ends the stream
        // after it is yielded.
        let paged = filtered
            .scan((0usize, 0usize, false), move |state, item| {
                let (skipped, yielded, failed) = state;
                if *failed {
                    return ready(None);
                }
                ready(match item {
                    Err(error) => {
                        *failed = true;
                        Some(Some(Err(error)))
                    }
                    Ok(record) => {
                        if *skipped < offset {
                            *skipped += 1;
                            Some(None)
                        } else if limit.map_or(true, |l| *yielded < l) {
                            *yielded += 1;
                            Some(Some(Ok(record)))
                        } else {
                            None
                        }
                    }
                })
            })
            .filter_map(ready);

        Ok(paged.boxed())
    }
}

fn clamp(value: Option<i64>) -> usize {
    value.map(|v| v.max(0) as usize).unwrap_or(0)
}

fn apply_paging(mut records: Vec<Json>, query: &Query) -> Vec<Json> {
    let offset = clamp(query.offset);
    if offset > 0 {
        records = if offset >= records.len() {
            Vec::new()
        } else {
            records.split_off(offset)
        };
    }
    if let Some(limit) = query.limit {
        records.truncate(limit.max(0) as usize);
    }
    records
}
