//! Operator emission for the SQL translator
//!
//! One module per operator family, mirroring the registry split. Every
//! emitter receives the schema-resolved column, the condition value, and
//! the shared parameter binder; all scalars bind as parameters.

mod fts;
mod geometry;
mod jsonb;
mod null;
mod set;
mod standard;
mod string;

use crate::ast::Value;
use crate::operators::{Family, Operator};

use super::errors::{BackendError, BackendResult};
use super::statement::ParamBinder;

/// Emits the predicate fragment for one condition.
pub(crate) fn emit_condition(
    operator: Operator,
    column: &str,
    value: Option<&Value>,
    params: &mut ParamBinder,
) -> BackendResult<String> {
    match operator.family() {
        Family::Comparison => standard::emit(operator, column, value, params),
        Family::Set => set::emit(operator, column, value, params),
        Family::String => string::emit(operator, column, value, params),
        Family::Null => null::emit(operator, column),
        Family::Jsonb => jsonb::emit(operator, column, value, params),
        Family::Geometry => geometry::emit(operator, column, value, params),
        Family::FullText => fts::emit(operator, column, value, params),
    }
}

/// Validation guarantees binary operators carry a value; this keeps the
/// error typed if a caller skips validation.
fn require_value<'a>(operator: Operator, value: Option<&'a Value>) -> BackendResult<&'a Value> {
    value.ok_or_else(|| BackendError::translation(operator.as_str(), "operator requires a value"))
}
