//! Core runtime for dirq: the query-descriptor accumulator, the
//! predicate/projection IR, the three lowering visitors, and the query
//! assembler that emits AQL text.
//!
//! Compilation is pure: given the same descriptor and schema metadata the
//! emitted query and count-query strings are byte-identical. All
//! traversal state is per-call and stack-local; descriptors, results, and
//! schema providers may be shared across threads freely.

pub mod descriptor;
pub mod error;
pub mod expr;
pub mod obs;
pub mod result;
pub mod value;

pub(crate) mod compile;
pub(crate) mod visitor;

#[cfg(test)]
pub(crate) mod test_fixtures;

///
/// Prelude
///
/// Domain vocabulary only; no visitors or internal pass state.
///

pub mod prelude {
    pub use crate::{
        descriptor::{Projection, QueryDescriptor, SortOrder, SortSpec},
        error::CompileError,
        expr::{CallExpr, Combine, CompareOp, Condition, Expr, MemberPath},
        result::QueryResult,
        value::Value,
    };
    pub use dirq_schema::{CollectionScope, SchemaProvider};
}
