//! Operator registry subsystem
//!
//! Enumerates the closed operator set with arities, value shapes, backend
//! support, and semantic families. Built once from a static table and
//! shared process-wide, read-only.

mod registry;

pub use registry::{Arity, Backend, Family, Operator, ValueShape};
