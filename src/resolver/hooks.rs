//! Resolution hook protocol
//!
//! Hooks intercept path resolution during SQL translation. When the
//! resolver meets a segment the schema does not know, registered hooks are
//! tried in order; the first one returning a result wins. Hooks may attach
//! joins, name a column directly, or emit a complete predicate fragment
//! with its bound parameters. They read the query but never mutate it.

use async_trait::async_trait;

use crate::ast::Value;

use super::join::{JoinPlan, JoinStep};

/// Traversal state handed to a hook for one unresolved segment.
pub struct ResolutionContext<'a> {
    /// Model the translation started from
    pub root_model: &'a str,
    /// Alias of the relation reached so far
    pub parent_alias: &'a str,
    /// Model reached so far
    pub parent_model: &'a str,
    /// The segment being resolved
    pub attribute: &'a str,
    /// Segments after the current one
    pub remaining: &'a [&'a str],
    /// Shared join plan; hooks may append steps through it
    pub plan: &'a mut JoinPlan,
}

impl ResolutionContext<'_> {
    /// True when the current segment is the final one in its path.
    pub fn is_leaf(&self) -> bool {
        self.remaining.is_empty()
    }
}

/// What a hook resolved the segment to.
#[derive(Debug, Clone, PartialEq)]
pub enum HookResult {
    /// A column to use directly, terminating resolution.
    Column { alias: String, column: String },
    /// Joins to attach; resolution continues from the given alias/model.
    Joins {
        steps: Vec<JoinStep>,
        continue_alias: String,
        continue_model: String,
    },
    /// A complete predicate fragment inserted verbatim, with its params.
    Fragment { sql: String, params: Vec<Value> },
}

/// Async interception of path resolution.
///
/// Returning `None` passes the segment to the next hook, and finally back
/// to the resolver's default handling.
#[async_trait]
pub trait ResolveHook: Send + Sync {
    async fn resolve(&self, ctx: ResolutionContext<'_>) -> Option<HookResult>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::FieldPath;
    use crate::resolver::join::{JoinKind, PathResolver, Resolved};
    use crate::resolver::schema::{ModelDef, Schema};
    use std::sync::Arc;

    struct TagHook;

    #[async_trait]
    impl ResolveHook for TagHook {
        async fn resolve(&self, ctx: ResolutionContext<'_>) -> Option<HookResult> {
            if ctx.attribute != "tags" {
                return None;
            }
            Some(HookResult::Fragment {
                sql: format!(
                    "EXISTS (SELECT 1 FROM taggings WHERE taggings.target_id = {}.id)",
                    ctx.parent_alias
                ),
                params: Vec::new(),
            })
        }
    }

    struct JoinHook;

    #[async_trait]
    impl ResolveHook for JoinHook {
        async fn resolve(&self, ctx: ResolutionContext<'_>) -> Option<HookResult> {
            if ctx.attribute != "latest_revision" {
                return None;
            }
            let alias = ctx.plan.allocate_alias("revisions", 1);
            Some(HookResult::Joins {
                steps: vec![JoinStep {
                    table: "revisions".into(),
                    alias: alias.clone(),
                    kind: JoinKind::Left,
                    on: format!("{}.id = {}.document_id", ctx.parent_alias, alias),
                }],
                continue_alias: alias,
                continue_model: "revision".into(),
            })
        }
    }

    fn schema() -> Schema {
        Schema::new()
            .model(ModelDef::new("document", "documents").columns(["id", "title"]))
            .model(ModelDef::new("revision", "revisions").columns(["id", "document_id", "note"]))
    }

    #[tokio::test]
    async fn test_fragment_hook_wins() {
        let schema = schema();
        let hooks: Vec<Arc<dyn ResolveHook>> = vec![Arc::new(TagHook)];
        let mut resolver = PathResolver::new(&schema, "document", &hooks).unwrap();

        match resolver.resolve(&FieldPath::from("tags")).await.unwrap() {
            Resolved::Fragment { sql, params } => {
                assert!(sql.contains("taggings"));
                assert!(sql.contains("documents.id"));
                assert!(params.is_empty());
            }
            other => panic!("expected fragment, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_join_hook_continues_traversal() {
        let schema = schema();
        let hooks: Vec<Arc<dyn ResolveHook>> = vec![Arc::new(JoinHook)];
        let mut resolver = PathResolver::new(&schema, "document", &hooks).unwrap();

        let resolved = resolver
            .resolve(&FieldPath::from("latest_revision.note"))
            .await
            .unwrap();

        assert_eq!(resolver.plan().steps().len(), 1);
        match resolved {
            Resolved::Column(column) => {
                assert_eq!(column.column, "note");
                assert_eq!(column.alias, "revisions_1");
            }
            other => panic!("expected column, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unclaimed_segment_still_fails() {
        let schema = schema();
        let hooks: Vec<Arc<dyn ResolveHook>> = vec![Arc::new(TagHook)];
        let mut resolver = PathResolver::new(&schema, "document", &hooks).unwrap();

        assert!(resolver.resolve(&FieldPath::from("nope")).await.is_err());
    }
}
