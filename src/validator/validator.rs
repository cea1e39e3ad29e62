//! Query structure validation
//!
//! Checks a query against the registry and a backend's permitted operator
//! set before any evaluation happens. Validation is purely structural: it
//! never consults the schema. Path existence is the resolver's job.

use crate::ast::{Condition, FieldPath, Group, GroupOp, Node, Query, Value};
use crate::operators::{Backend, Operator, ValueShape};

use super::errors::{ValidationError, ValidationResult};

/// Default maximum group nesting depth.
pub const DEFAULT_MAX_DEPTH: usize = 8;

/// Default maximum number of dotted path segments.
pub const DEFAULT_MAX_PATH_SEGMENTS: usize = 8;

/// Validates query structure, operators, and value shapes.
///
/// ```
/// use searchql::ast::QueryBuilder;
/// use searchql::operators::Backend;
/// use searchql::validator::QueryValidator;
///
/// let query = QueryBuilder::new().condition("status", "=", "active").build();
/// QueryValidator::for_backend(Backend::Memory).validate(&query).unwrap();
/// ```
pub struct QueryValidator {
    backend: Backend,
    max_depth: usize,
    max_path_segments: usize,
}

impl QueryValidator {
    /// Validator permitting the operator subset of the given backend.
    pub fn for_backend(backend: Backend) -> Self {
        Self {
            backend,
            max_depth: DEFAULT_MAX_DEPTH,
            max_path_segments: DEFAULT_MAX_PATH_SEGMENTS,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Validates the whole query. Returns the first violation found,
    /// walking groups depth-first, left to right.
    pub fn validate(&self, query: &Query) -> ValidationResult<()> {
        if let Some(limit) = query.limit {
            if limit < 0 {
                return Err(ValidationError::InvalidPaging {
                    message: format!("limit must be >= 0, got {limit}"),
                });
            }
        }
        if let Some(offset) = query.offset {
            if offset < 0 {
                return Err(ValidationError::InvalidPaging {
                    message: format!("offset must be >= 0, got {offset}"),
                });
            }
        }

        for key in &query.order_by {
            self.check_path(&key.path)?;
        }

        for (index, group) in query.groups.iter().enumerate() {
            self.validate_group(group, &format!("groups[{index}]"), 0)?;
        }
        Ok(())
    }

    fn validate_group(&self, group: &Group, location: &str, depth: usize) -> ValidationResult<()> {
        if depth > self.max_depth {
            return Err(ValidationError::DepthExceeded {
                max: self.max_depth,
            });
        }

        if group.children.is_empty() {
            return Err(ValidationError::EmptyGroup {
                location: location.to_string(),
            });
        }

        if group.op == GroupOp::Not && group.children.len() != 1 {
            return Err(ValidationError::InvalidNot {
                arity: group.children.len(),
            });
        }

        for (index, child) in group.children.iter().enumerate() {
            let child_location = format!("{location}.conditions[{index}]");
            match child {
                Node::Group(nested) => self.validate_group(nested, &child_location, depth + 1)?,
                Node::Condition(condition) => self.validate_condition(condition)?,
            }
        }
        Ok(())
    }

    fn validate_condition(&self, condition: &Condition) -> ValidationResult<()> {
        self.check_path(&condition.field)?;

        let operator = Operator::parse(&condition.operator).ok_or_else(|| {
            ValidationError::UnknownOperator {
                operator: condition.operator.clone(),
                suggestion: Operator::suggest(&condition.operator),
            }
        })?;

        if !operator.supported_by(self.backend) {
            return Err(ValidationError::OperatorNotSupportedByBackend {
                operator: condition.operator.clone(),
                backend: self.backend,
            });
        }

        self.check_value_shape(operator, condition.value.as_ref())
    }

    fn check_value_shape(&self, operator: Operator, value: Option<&Value>) -> ValidationResult<()> {
        let shape = operator.value_shape();
        let mismatch = |got: String| ValidationError::ValueShapeMismatch {
            operator: operator.as_str().to_string(),
            expected: shape.expected(),
            got,
        };

        let value = match (shape, value) {
            (ValueShape::NoValue, None) => return Ok(()),
            (ValueShape::NoValue, Some(v)) => return Err(mismatch(v.kind().to_string())),
            (_, None) => return Err(mismatch("no value".to_string())),
            (_, Some(v)) => v,
        };

        let ok = match shape {
            ValueShape::NoValue => true,
            ValueShape::Scalar => value.is_scalar(),
            ValueShape::OrderedScalar => value.is_ordered_scalar(),
            ValueShape::Pattern | ValueShape::Text | ValueShape::TokenText => {
                value.as_str().is_some()
            }
            ValueShape::List => matches!(value, Value::List(_)),
            ValueShape::StringList => match value {
                Value::List(items) => items.iter().all(|v| v.as_str().is_some()),
                _ => false,
            },
            ValueShape::RangePair => match value.as_range() {
                // Inclusive bounds; low must not exceed high.
                Some((low, high)) => low
                    .partial_cmp(high)
                    .map(|ordering| ordering != std::cmp::Ordering::Greater)
                    .unwrap_or(false),
                None => false,
            },
            ValueShape::Geometry => value.as_geometry().is_some(),
            ValueShape::Bbox => value.as_bbox().is_some(),
            ValueShape::DWithinPair => value.as_dwithin().is_some(),
            ValueShape::Json => true,
        };

        if ok {
            Ok(())
        } else {
            Err(mismatch(describe_value(value)))
        }
    }

    fn check_path(&self, path: &FieldPath) -> ValidationResult<()> {
        let malformed = |reason: &str| ValidationError::MalformedPath {
            path: path.as_str().to_string(),
            reason: reason.to_string(),
        };

        if path.as_str().is_empty() {
            return Err(malformed("path is empty"));
        }
        if path.segment_count() > self.max_path_segments {
            return Err(malformed("too many segments"));
        }
        for segment in path.segments() {
            if !is_identifier(segment) {
                return Err(malformed("segments must match [A-Za-z_][A-Za-z0-9_]*"));
            }
        }
        Ok(())
    }
}

fn is_identifier(segment: &str) -> bool {
    let mut chars = segment.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn describe_value(value: &Value) -> String {
    match value {
        Value::List(items) => format!("a list of {} items", items.len()),
        other => other.kind().to_string(),
    }
}
