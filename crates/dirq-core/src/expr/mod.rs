//! Module: expr
//! Responsibility: the predicate/projection intermediate representation.
//! Pure, schema-agnostic trees; all interpretation happens in the visitor
//! passes. Closed sum types keep dispatch exhaustive: a node kind the
//! compiler cannot lower fails at the visitor, never silently.

mod condition;
mod node;


pub use condition::{Combine, Condition};
pub use node::{CallExpr, CompareOp, Expr, MemberPath};
