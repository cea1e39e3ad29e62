//! Join plans and dotted-path resolution
//!
//! Turns a dotted field path into a chain of joined relations ending in a
//! column reference. Within one query, identical path prefixes share an
//! alias; self-referential relations always get a fresh alias per traversal
//! occurrence so repeated hops over the same table never collapse into an
//! accidental self-equi-join.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::ast::FieldPath;
use crate::fuzzy::closest_match;

use super::errors::{ResolutionError, ResolutionResult};
use super::hooks::{HookResult, ResolutionContext, ResolveHook};
use super::schema::SchemaIntrospector;

/// Join flavor emitted for a relation hop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
}

impl JoinKind {
    pub fn as_sql(&self) -> &'static str {
        match self {
            JoinKind::Inner => "INNER JOIN",
            JoinKind::Left => "LEFT JOIN",
        }
    }
}

/// One aliased relation attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinStep {
    /// Joined table name
    pub table: String,
    /// Alias assigned to this attachment
    pub alias: String,
    pub kind: JoinKind,
    /// ON condition, fully qualified
    pub on: String,
}

/// Terminal column reference produced by resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRef {
    pub alias: String,
    pub column: String,
}

impl ColumnRef {
    pub fn qualified(&self) -> String {
        format!("{}.{}", self.alias, self.column)
    }
}

/// Outcome of resolving one path.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    /// A schema column behind zero or more joins
    Column(ColumnRef),
    /// A hook-supplied predicate fragment, inserted verbatim
    Fragment {
        sql: String,
        params: Vec<crate::ast::Value>,
    },
}

/// Ordered join list shared by every path of one translation.
#[derive(Debug)]
pub struct JoinPlan {
    root_model: String,
    root_table: String,
    steps: Vec<JoinStep>,
    // path prefix -> (alias, model name); self-referential hops are never
    // cached, per the alias policy.
    alias_cache: HashMap<String, (String, String)>,
    used_aliases: HashSet<String>,
}

impl JoinPlan {
    pub fn new(root_model: impl Into<String>, root_table: impl Into<String>) -> Self {
        let root_table = root_table.into();
        let mut used_aliases = HashSet::new();
        used_aliases.insert(root_table.clone());
        Self {
            root_model: root_model.into(),
            root_table,
            steps: Vec::new(),
            alias_cache: HashMap::new(),
            used_aliases,
        }
    }

    pub fn root_model(&self) -> &str {
        &self.root_model
    }

    /// The root relation doubles as its own alias.
    pub fn root_alias(&self) -> &str {
        &self.root_table
    }

    pub fn steps(&self) -> &[JoinStep] {
        &self.steps
    }

    /// Appends a join step. Hooks use this to attach custom joins.
    pub fn push_step(&mut self, step: JoinStep) {
        self.used_aliases.insert(step.alias.clone());
        self.steps.push(step);
    }

    /// Allocates a stable, collision-free alias: `{table}_{depth}`, with a
    /// counter suffix when that name is taken.
    pub fn allocate_alias(&mut self, table: &str, depth: usize) -> String {
        let mut candidate = format!("{table}_{depth}");
        let mut counter = 2;
        while self.used_aliases.contains(&candidate) {
            candidate = format!("{table}_{depth}_{counter}");
            counter += 1;
        }
        self.used_aliases.insert(candidate.clone());
        candidate
    }
}

/// Resolves dotted paths against a schema, accumulating a shared join plan.
pub struct PathResolver<'a> {
    schema: &'a dyn SchemaIntrospector,
    hooks: &'a [Arc<dyn ResolveHook>],
    plan: JoinPlan,
}

impl<'a> PathResolver<'a> {
    pub fn new(
        schema: &'a dyn SchemaIntrospector,
        root_model: &str,
        hooks: &'a [Arc<dyn ResolveHook>],
    ) -> ResolutionResult<Self> {
        let root = schema
            .model(root_model)
            .ok_or_else(|| ResolutionError::UnknownModel {
                model: root_model.to_string(),
            })?;
        Ok(Self {
            schema,
            hooks,
            plan: JoinPlan::new(root.name.clone(), root.table.clone()),
        })
    }

    pub fn plan(&self) -> &JoinPlan {
        &self.plan
    }

    pub fn into_plan(self) -> JoinPlan {
        self.plan
    }

    /// Resolves one dotted path to a column reference or a hook fragment,
    /// extending the shared join plan as needed.
    pub async fn resolve(&mut self, path: &FieldPath) -> ResolutionResult<Resolved> {
        let segments: Vec<&str> = path.segments().collect();
        let mut current_model = self.plan.root_model.clone();
        let mut current_alias = self.plan.root_alias().to_string();
        // Tables traversed so far, root included; a relation targeting any
        // of them is self-referential for aliasing purposes.
        let mut chain_tables = vec![self.plan.root_table.clone()];

        let mut index = 0;
        while index < segments.len() {
            let segment = segments[index];
            let is_last = index == segments.len() - 1;
            let model = self.schema.model(&current_model).ok_or_else(|| {
                ResolutionError::UnknownModel {
                    model: current_model.clone(),
                }
            })?;

            if is_last && model.columns.contains(segment) {
                return Ok(Resolved::Column(ColumnRef {
                    alias: current_alias,
                    column: segment.to_string(),
                }));
            }

            if is_last && model.relations.contains_key(segment) {
                return Err(ResolutionError::InvalidLeaf {
                    path: path.as_str().to_string(),
                    reason: format!("'{segment}' is a relation, not a scalar column"),
                });
            }

            if !is_last && model.columns.contains(segment) {
                return Err(ResolutionError::InvalidLeaf {
                    path: path.as_str().to_string(),
                    reason: format!("cannot traverse through scalar column '{segment}'"),
                });
            }

            if let Some(relation) = model.relations.get(segment).cloned() {
                let target = self.schema.model(&relation.target_model).ok_or_else(|| {
                    ResolutionError::UnknownModel {
                        model: relation.target_model.clone(),
                    }
                })?;
                let target_table = target.table.clone();
                let target_model = target.name.clone();

                let prefix = segments[..=index].join(".");
                let self_referential = chain_tables.contains(&target_table);

                if !self_referential {
                    if let Some((alias, model_name)) = self.plan.alias_cache.get(&prefix) {
                        current_alias = alias.clone();
                        current_model = model_name.clone();
                        chain_tables.push(target_table);
                        index += 1;
                        continue;
                    }
                }

                let alias = self.plan.allocate_alias(&target_table, index + 1);
                let on = format!(
                    "{}.{} = {}.{}",
                    current_alias, relation.local_column, alias, relation.remote_column
                );
                self.plan.steps.push(JoinStep {
                    table: target_table.clone(),
                    alias: alias.clone(),
                    kind: JoinKind::Left,
                    on,
                });
                if !self_referential {
                    self.plan
                        .alias_cache
                        .insert(prefix, (alias.clone(), target_model.clone()));
                }

                current_alias = alias;
                current_model = target_model;
                chain_tables.push(target_table);
                index += 1;
                continue;
            }

            // Unknown segment: give registered hooks a chance before failing.
            let remaining = &segments[index + 1..];
            match self
                .run_hooks(&current_alias, &current_model, segment, remaining)
                .await
            {
                Some(HookResult::Column { alias, column }) => {
                    return Ok(Resolved::Column(ColumnRef { alias, column }));
                }
                Some(HookResult::Fragment { sql, params }) => {
                    return Ok(Resolved::Fragment { sql, params });
                }
                Some(HookResult::Joins {
                    steps,
                    continue_alias,
                    continue_model,
                }) => {
                    for step in steps {
                        chain_tables.push(step.table.clone());
                        self.plan.push_step(step);
                    }
                    current_alias = continue_alias;
                    current_model = continue_model;
                    index += 1;
                    continue;
                }
                None => {
                    let model = self.schema.model(&current_model).ok_or_else(|| {
                        ResolutionError::UnknownModel {
                            model: current_model.clone(),
                        }
                    })?;
                    let suggestion = closest_match(segment, model.attribute_names());
                    return Err(ResolutionError::UnknownField {
                        path: path.as_str().to_string(),
                        segment: segment.to_string(),
                        model: current_model,
                        suggestion,
                    });
                }
            }
        }

        // Paths are non-empty, so the loop always returns before falling out.
        Err(ResolutionError::InvalidLeaf {
            path: path.as_str().to_string(),
            reason: "empty path".to_string(),
        })
    }

    async fn run_hooks(
        &mut self,
        parent_alias: &str,
        parent_model: &str,
        attribute: &str,
        remaining: &[&str],
    ) -> Option<HookResult> {
        let root_model = self.plan.root_model.clone();
        for hook in self.hooks {
            let ctx = ResolutionContext {
                root_model: &root_model,
                parent_alias,
                parent_model,
                attribute,
                remaining,
                plan: &mut self.plan,
            };
            if let Some(result) = hook.resolve(ctx).await {
                return Some(result);
            }
        }
        None
    }
}
