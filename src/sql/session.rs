//! Database session seam
//!
//! The backend never owns a connection. Callers hand in anything that can
//! execute a parameterized statement and return rows as JSON objects,
//! either fully materialized or as a server-side cursor stream.

use async_trait::async_trait;
use futures::stream::BoxStream;

use super::errors::SessionError;
use super::statement::SqlStatement;

/// One result row, keyed by column name.
pub type Row = serde_json::Value;

/// Caller-owned database session.
///
/// A session is used exclusively by one search invocation at a time; the
/// translator holds it only across the calls below and through the cursor
/// stream it returns.
#[async_trait]
pub trait Session: Send {
    /// Executes the statement and materializes every row.
    async fn fetch_all(&mut self, statement: &SqlStatement) -> Result<Vec<Row>, SessionError>;

    /// Executes the statement through a server-side cursor, yielding rows
    /// without buffering the full result client-side.
    async fn fetch_stream<'a>(
        &'a mut self,
        statement: &SqlStatement,
    ) -> Result<BoxStream<'a, Result<Row, SessionError>>, SessionError>;
}
