//! Fluent query builder
//!
//! Accumulates conditions into an implicit top-level AND group, with
//! explicit top-level and nested groups available for richer boolean
//! shapes. `build()` consumes the builder and emits the immutable AST.

use super::query::{Condition, Group, GroupOp, Node, OrderKey, Query};
use super::value::Value;

/// Builder for [`Query`] values.
///
/// ```
/// use searchql::ast::QueryBuilder;
///
/// let query = QueryBuilder::new()
///     .condition("status", "=", "active")
///     .condition("priority", ">", 5)
///     .order_by(["-created_at"])
///     .limit(10)
///     .build();
/// assert_eq!(query.groups.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct QueryBuilder {
    groups: Vec<Group>,
    // Indices into the open nested-group chain of the current top-level
    // group; children resolve through it on push.
    stack: Vec<usize>,
    limit: Option<i64>,
    offset: Option<i64>,
    order_by: Vec<OrderKey>,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new top-level group. Top-level groups are conjoined.
    pub fn group(mut self, op: GroupOp) -> Self {
        self.groups.push(Group::new(op));
        self.stack.clear();
        self
    }

    /// Opens a nested group inside the current group.
    pub fn nested(mut self, op: GroupOp) -> Self {
        self.ensure_group();
        let depth = {
            let current = self.current_group();
            current.children.push(Node::Group(Group::new(op)));
            current.children.len() - 1
        };
        self.stack.push(depth);
        self
    }

    /// Closes the innermost nested group.
    pub fn end(mut self) -> Self {
        self.stack.pop();
        self
    }

    /// Adds a binary condition to the current group.
    pub fn condition(
        mut self,
        field: &str,
        operator: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        self.ensure_group();
        self.current_group()
            .children
            .push(Node::Condition(Condition::new(field, operator, value)));
        self
    }

    /// Adds a unary condition (`is_null`, `is_empty`, ...) to the current group.
    pub fn unary_condition(mut self, field: &str, operator: impl Into<String>) -> Self {
        self.ensure_group();
        self.current_group()
            .children
            .push(Node::Condition(Condition::unary(field, operator)));
        self
    }

    /// Sets the ordering keys from their textual form (`"-field"` for DESC).
    pub fn order_by<I, S>(mut self, specs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.order_by = specs
            .into_iter()
            .map(|s| OrderKey::parse(s.as_ref()))
            .collect();
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: i64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Builds the query. The builder retains no reference to the result.
    pub fn build(self) -> Query {
        Query {
            groups: self.groups,
            limit: self.limit,
            offset: self.offset,
            order_by: self.order_by,
        }
    }

    fn ensure_group(&mut self) {
        if self.groups.is_empty() {
            self.groups.push(Group::new(GroupOp::And));
        }
    }

    // Callers run ensure_group first; the stack only ever indexes group nodes.
    fn current_group(&mut self) -> &mut Group {
        let mut group = self.groups.last_mut().expect("ensure_group ran");
        for &index in &self.stack {
            match &mut group.children[index] {
                Node::Group(nested) => group = nested,
                Node::Condition(_) => unreachable!(),
            }
        }
        group
    }
}
