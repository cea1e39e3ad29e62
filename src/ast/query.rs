//! Search query AST
//!
//! Immutable tree of boolean groups and field conditions, plus ordering and
//! paging. Queries are built once, validated once, then consumed read-only
//! by the backends. The serde shape matches the JSON query document:
//! groups carry `group_operator` (defaulting to `and`) and a `conditions`
//! array that mixes nested groups and leaf conditions; `order_by` entries
//! are field paths with a leading `-` for descending order.

use std::fmt;

use serde::de::{Deserializer, Error as DeError};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use super::value::Value;

/// Dotted field path, e.g. `profile.address.city`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldPath(String);

impl FieldPath {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Path segments in traversal order.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('.')
    }

    pub fn segment_count(&self) -> usize {
        self.0.split('.').count()
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for FieldPath {
    fn from(path: &str) -> Self {
        Self(path.to_string())
    }
}

impl From<String> for FieldPath {
    fn from(path: String) -> Self {
        Self(path)
    }
}

/// A leaf predicate: `field operator value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    /// Field name or dotted path
    pub field: FieldPath,
    /// Operator tag, resolved against the registry during validation
    pub operator: String,
    /// Comparison value; absent for the unary operators
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl Condition {
    pub fn new(
        field: impl Into<FieldPath>,
        operator: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        Self {
            field: field.into(),
            operator: operator.into(),
            value: Some(value.into()),
        }
    }

    /// Condition without a value, for the unary operators.
    pub fn unary(field: impl Into<FieldPath>, operator: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            operator: operator.into(),
            value: None,
        }
    }
}

/// Logical combinator for a group's children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupOp {
    And,
    Or,
    Not,
}

impl GroupOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupOp::And => "and",
            GroupOp::Or => "or",
            GroupOp::Not => "not",
        }
    }
}

impl Default for GroupOp {
    fn default() -> Self {
        GroupOp::And
    }
}

/// A group child: nested group or leaf condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Group(Group),
    Condition(Condition),
}

impl From<Group> for Node {
    fn from(group: Group) -> Self {
        Node::Group(group)
    }
}

impl From<Condition> for Node {
    fn from(condition: Condition) -> Self {
        Node::Condition(condition)
    }
}

/// A boolean group of conditions and nested groups.
///
/// `not` groups take exactly one child; empty groups are rejected by the
/// validator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    #[serde(default, rename = "group_operator")]
    pub op: GroupOp,
    #[serde(rename = "conditions")]
    pub children: Vec<Node>,
}

impl Group {
    pub fn new(op: GroupOp) -> Self {
        Self {
            op,
            children: Vec::new(),
        }
    }

    pub fn with_children(op: GroupOp, children: Vec<Node>) -> Self {
        Self { op, children }
    }

    /// Appends a child node.
    pub fn push(&mut self, node: impl Into<Node>) {
        self.children.push(node.into());
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        }
    }
}

/// One ordering key. The textual form prefixes the path with `-` for DESC.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderKey {
    pub path: FieldPath,
    pub direction: Direction,
}

impl OrderKey {
    pub fn asc(path: impl Into<FieldPath>) -> Self {
        Self {
            path: path.into(),
            direction: Direction::Asc,
        }
    }

    pub fn desc(path: impl Into<FieldPath>) -> Self {
        Self {
            path: path.into(),
            direction: Direction::Desc,
        }
    }

    /// Parses the `"-field"` textual form.
    pub fn parse(spec: &str) -> Self {
        match spec.strip_prefix('-') {
            Some(path) => Self::desc(path),
            None => Self::asc(spec),
        }
    }
}

impl fmt::Display for OrderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.direction {
            Direction::Asc => write!(f, "{}", self.path),
            Direction::Desc => write!(f, "-{}", self.path),
        }
    }
}

impl Serialize for OrderKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for OrderKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let spec = String::deserialize(deserializer)?;
        if spec.is_empty() || spec == "-" {
            return Err(D::Error::custom("empty order_by entry"));
        }
        Ok(OrderKey::parse(&spec))
    }
}

/// Top-level search query.
///
/// Multiple groups are conjoined. `limit`/`offset` are kept signed so that
/// out-of-range wire input reaches the validator as a paging error instead
/// of a deserialization failure.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Query {
    #[serde(default)]
    pub groups: Vec<Group>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub order_by: Vec<OrderKey>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when no group carries any condition.
    pub fn is_empty(&self) -> bool {
        self.groups.iter().all(|g| g.children.is_empty())
    }

    /// AND-composes another query's groups into this one.
    ///
    /// Since top-level groups are conjoined, the result matches records
    /// satisfying both queries. Paging and ordering from `self` win when
    /// set. The common use is merging a user query with authorization
    /// filters.
    pub fn merge(&self, other: &Query) -> Query {
        Query {
            groups: self
                .groups
                .iter()
                .chain(other.groups.iter())
                .cloned()
                .collect(),
            limit: self.limit.or(other.limit),
            offset: self.offset.or(other.offset),
            order_by: if self.order_by.is_empty() {
                other.order_by.clone()
            } else {
                self.order_by.clone()
            },
        }
    }

    /// Parses a JSON query document.
    pub fn from_json(json: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(json)
    }

    /// Serializes to the JSON query document shape.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    /// Every condition in the tree, depth-first, left to right.
    pub fn conditions(&self) -> impl Iterator<Item = &Condition> {
        fn collect<'a>(node: &'a Node, out: &mut Vec<&'a Condition>) {
            match node {
                Node::Condition(c) => out.push(c),
                Node::Group(g) => {
                    for child in &g.children {
                        collect(child, out);
                    }
                }
            }
        }
        let mut out = Vec::new();
        for group in &self.groups {
            for child in &group.children {
                collect(child, &mut out);
            }
        }
        out.into_iter()
    }
}
