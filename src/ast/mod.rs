//! Query AST for the search DSL
//!
//! The tree is a pure value type: boolean groups over leaf conditions,
//! plus ordering and paging. Construction goes through [`QueryBuilder`]
//! or the JSON query document; evaluation never mutates the tree.

mod builder;
mod query;
mod value;

pub use builder::QueryBuilder;
pub use query::{Condition, Direction, FieldPath, Group, GroupOp, Node, OrderKey, Query};
pub use value::{Geometry, GeometryKind, Value};
