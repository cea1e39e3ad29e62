//! Schema introspection for the SQL backend
//!
//! The resolver only needs two facts about a model: its scalar columns and
//! its named relations. [`SchemaIntrospector`] is the read-only seam; the
//! concrete [`Schema`] registry covers the common case of a hand-declared
//! model graph.

use std::collections::{BTreeMap, BTreeSet, HashMap};

/// A named relation from one model to another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationDef {
    /// Target model name
    pub target_model: String,
    /// Column on the source model's table
    pub local_column: String,
    /// Column on the target model's table
    pub remote_column: String,
}

impl RelationDef {
    pub fn new(
        target_model: impl Into<String>,
        local_column: impl Into<String>,
        remote_column: impl Into<String>,
    ) -> Self {
        Self {
            target_model: target_model.into(),
            local_column: local_column.into(),
            remote_column: remote_column.into(),
        }
    }
}

/// One queryable model: a table, its scalar columns, and its relations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelDef {
    /// Model name used in queries
    pub name: String,
    /// Backing table name
    pub table: String,
    /// Scalar column names
    pub columns: BTreeSet<String>,
    /// Relations by attribute name
    pub relations: BTreeMap<String, RelationDef>,
}

impl ModelDef {
    pub fn new(name: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table: table.into(),
            columns: BTreeSet::new(),
            relations: BTreeMap::new(),
        }
    }

    /// Adds scalar columns.
    pub fn columns<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns.extend(names.into_iter().map(Into::into));
        self
    }

    /// Adds a relation reachable via `name`.
    pub fn relation(
        mut self,
        name: impl Into<String>,
        target_model: impl Into<String>,
        local_column: impl Into<String>,
        remote_column: impl Into<String>,
    ) -> Self {
        self.relations.insert(
            name.into(),
            RelationDef::new(target_model, local_column, remote_column),
        );
        self
    }

    /// Attribute names usable in paths, for error suggestions.
    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        self.columns
            .iter()
            .map(String::as_str)
            .chain(self.relations.keys().map(String::as_str))
    }
}

/// Read-only schema lookup used during path resolution.
pub trait SchemaIntrospector: Send + Sync {
    /// Returns the model definition, if registered.
    fn model(&self, name: &str) -> Option<&ModelDef>;
}

/// In-memory model registry.
///
/// ```
/// use searchql::resolver::{ModelDef, Schema};
///
/// let schema = Schema::new()
///     .model(
///         ModelDef::new("ticket", "tickets")
///             .columns(["id", "status", "priority"])
///             .relation("assignee", "user", "assignee_id", "id"),
///     )
///     .model(ModelDef::new("user", "users").columns(["id", "name"]));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Schema {
    models: HashMap<String, ModelDef>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a model.
    pub fn model(mut self, def: ModelDef) -> Self {
        self.models.insert(def.name.clone(), def);
        self
    }
}

impl SchemaIntrospector for Schema {
    fn model(&self, name: &str) -> Option<&ModelDef> {
        self.models.get(name)
    }
}
