//! Path resolution subsystem
//!
//! Turns dotted field paths into join plans over a declared model graph.
//! Alias policy: identical path prefixes share one alias per query;
//! self-referential relations get a fresh alias per traversal occurrence.
//! Hooks can intercept unknown segments before resolution fails.

mod errors;
mod hooks;
mod join;
mod schema;

pub use errors::{ResolutionError, ResolutionResult};
pub use hooks::{HookResult, ResolutionContext, ResolveHook};
pub use join::{ColumnRef, JoinKind, JoinPlan, JoinStep, PathResolver, Resolved};
pub use schema::{ModelDef, RelationDef, Schema, SchemaIntrospector};
