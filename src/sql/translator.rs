//! SQL translation and execution
//!
//! Lowers a validated query against a root model into one parameterized
//! SELECT. The walk resolves every condition and ordering path up front,
//! building the shared join plan, then composes the WHERE tree and emits
//! joins, filters, ordering, and paging in statement order.

use std::sync::Arc;

use futures::stream::{BoxStream, StreamExt};
use tracing::debug;

use crate::ast::{Condition, Direction, Group, GroupOp, Node, Query};
use crate::error::SearchError;
use crate::operators::{Backend, Operator};
use crate::resolver::{ColumnRef, PathResolver, Resolved, ResolveHook, SchemaIntrospector};
use crate::validator::{QueryValidator, ValidationError};

use super::errors::BackendError;
use super::ops;
use super::session::{Row, Session};
use super::statement::{ParamBinder, SqlStatement};

/// SQL search backend: translates queries and runs them on a caller-owned
/// session.
pub struct SqlBackend<'a> {
    schema: &'a dyn SchemaIntrospector,
    hooks: Vec<Arc<dyn ResolveHook>>,
}

impl<'a> SqlBackend<'a> {
    pub fn new(schema: &'a dyn SchemaIntrospector) -> Self {
        Self {
            schema,
            hooks: Vec::new(),
        }
    }

    /// Registers resolution hooks, tried in order during translation.
    pub fn with_hooks(mut self, hooks: Vec<Arc<dyn ResolveHook>>) -> Self {
        self.hooks = hooks;
        self
    }

    /// Translates a query into one parameterized SELECT against `model`.
    pub async fn translate(&self, query: &Query, model: &str) -> Result<SqlStatement, SearchError> {
        QueryValidator::for_backend(Backend::Sql).validate(query)?;

        let mut resolver = PathResolver::new(self.schema, model, &self.hooks)?;

        // Pre-traverse: resolve every condition path in walk order, one
        // entry per occurrence, so hooks fire left to right and the join
        // plan is complete before emission.
        let mut resolutions = Vec::new();
        for condition in query.conditions() {
            resolutions.push(resolver.resolve(&condition.field).await?);
        }

        let mut order_columns: Vec<(ColumnRef, Direction)> = Vec::new();
        for key in &query.order_by {
            match resolver.resolve(&key.path).await? {
                Resolved::Column(column) => order_columns.push((column, key.direction)),
                Resolved::Fragment { .. } => {
                    return Err(BackendError::translation(
                        "order_by",
                        format!("ordering path '{}' resolved to a custom fragment", key.path),
                    )
                    .into());
                }
            }
        }

        let plan = resolver.into_plan();
        let mut binder = ParamBinder::new();

        let mut where_clauses = Vec::new();
        let mut remaining = resolutions.iter();
        for group in &query.groups {
            if let Some(clause) = translate_group(group, &mut remaining, &mut binder)? {
                where_clauses.push(clause);
            }
        }

        let mut sql = format!(
            "SELECT {root}.* FROM {root}",
            root = plan.root_alias()
        );
        for step in plan.steps() {
            sql.push_str(&format!(
                " {} {} AS {} ON {}",
                step.kind.as_sql(),
                step.table,
                step.alias,
                step.on
            ));
        }
        if !where_clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&where_clauses.join(" AND "));
        }
        if !order_columns.is_empty() {
            let keys: Vec<String> = order_columns
                .iter()
                .map(|(column, direction)| match direction {
                    Direction::Asc => format!("{} ASC NULLS LAST", column.qualified()),
                    Direction::Desc => format!("{} DESC NULLS FIRST", column.qualified()),
                })
                .collect();
            sql.push_str(" ORDER BY ");
            sql.push_str(&keys.join(", "));
        }
        if let Some(limit) = query.limit {
            let placeholder = binder.bind(crate::ast::Value::Int(limit));
            sql.push_str(&format!(" LIMIT {placeholder}"));
        }
        if let Some(offset) = query.offset {
            let placeholder = binder.bind(crate::ast::Value::Int(offset));
            sql.push_str(&format!(" OFFSET {placeholder}"));
        }

        Ok(SqlStatement {
            sql,
            params: binder.into_params(),
        })
    }

    /// Translates and executes, materializing every row.
    pub async fn execute_all(
        &self,
        query: &Query,
        model: &str,
        session: &mut dyn Session,
    ) -> Result<Vec<Row>, SearchError> {
        let statement = self.translate(query, model).await?;
        debug!(sql = %statement.sql, params = statement.params.len(), "executing search");
        let rows = session
            .fetch_all(&statement)
            .await
            .map_err(BackendError::ExecutionFailed)?;
        Ok(rows)
    }

    /// Translates and executes through a server-side cursor. Rows arrive
    /// lazily; nothing is buffered client-side.
    pub async fn execute_stream<'s>(
        &self,
        query: &Query,
        model: &str,
        session: &'s mut dyn Session,
    ) -> Result<BoxStream<'s, Result<Row, SearchError>>, SearchError> {
        let statement = self.translate(query, model).await?;
        debug!(sql = %statement.sql, params = statement.params.len(), "executing search stream");
        let rows = session
            .fetch_stream(&statement)
            .await
            .map_err(BackendError::ExecutionFailed)?;
        Ok(rows
            .map(|row| row.map_err(|error| BackendError::ExecutionFailed(error).into()))
            .boxed())
    }
}

fn translate_group(
    group: &Group,
    resolutions: &mut std::slice::Iter<'_, Resolved>,
    binder: &mut ParamBinder,
) -> Result<Option<String>, SearchError> {
    let mut clauses = Vec::new();
    for child in &group.children {
        let clause = match child {
            Node::Group(nested) => translate_group(nested, resolutions, binder)?,
            Node::Condition(condition) => {
                // Pre-traversal produced one resolution per condition, in
                // the same walk order.
                let resolved = resolutions.next().ok_or_else(|| {
                    BackendError::translation(
                        condition.operator.clone(),
                        "resolution missing for condition",
                    )
                })?;
                Some(translate_condition(condition, resolved, binder)?)
            }
        };
        if let Some(clause) = clause {
            clauses.push(clause);
        }
    }

    if clauses.is_empty() {
        return Ok(None);
    }

    Ok(Some(match group.op {
        GroupOp::And => compose(&clauses, " AND "),
        GroupOp::Or => compose(&clauses, " OR "),
        GroupOp::Not => format!("NOT ({})", compose_bare(&clauses, " AND ")),
    }))
}

fn compose(clauses: &[String], separator: &str) -> String {
    if clauses.len() == 1 {
        clauses[0].clone()
    } else {
        format!("({})", clauses.join(separator))
    }
}

fn compose_bare(clauses: &[String], separator: &str) -> String {
    clauses.join(separator)
}

fn translate_condition(
    condition: &Condition,
    resolved: &Resolved,
    binder: &mut ParamBinder,
) -> Result<String, SearchError> {
    match resolved {
        Resolved::Fragment { sql, params } => {
            Ok(format!("({})", binder.splice_fragment(sql, params.clone())))
        }
        Resolved::Column(column) => {
            let operator = Operator::parse(&condition.operator).ok_or_else(|| {
                ValidationError::UnknownOperator {
                    operator: condition.operator.clone(),
                    suggestion: Operator::suggest(&condition.operator),
                }
            })?;
            Ok(ops::emit_condition(
                operator,
                &column.qualified(),
                condition.value.as_ref(),
                binder,
            )?)
        }
    }
}
