//! dirq — a fluent query compiler for directory entities.
//!
//! ## Crate layout
//! - `core`: descriptor accumulator, expression IR, lowering visitors, and
//!   the AQL assembler.
//! - `schema`: static entity metadata, property mappings, and the
//!   `SchemaProvider` resolution trait.
//!
//! The `prelude` module mirrors the surface used by service code building
//! and compiling queries.

pub use dirq_core as core;
pub use dirq_schema as schema;

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use core::error::CompileError;

///
/// Service Prelude
///

pub mod prelude {
    pub use crate::core::{
        descriptor::{Projection, QueryDescriptor, SortOrder, SortSpec},
        error::CompileError,
        expr::{CallExpr, Combine, CompareOp, Condition, Expr, MemberPath},
        obs::{MetricsSnapshot, metrics_reset, metrics_snapshot},
        result::QueryResult,
        value::Value,
    };
    pub use crate::schema::{
        CollectionScope, Discriminator, EntityModel, FieldType, MappingDescriptor, PropertyMap,
        SchemaError, SchemaProvider, StaticSchema, VirtualProperty,
    };
}
