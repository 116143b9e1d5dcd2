//! Schema metadata for the dirq query compiler: entity models, collection
//! scopes, type discriminators, virtual properties, and the cross-entity
//! property mappings that drive view conversion sub-fetches.
//!
//! Everything here is read-only `&'static` data. Providers may be shared
//! freely across concurrent compile passes.

pub mod model;
pub mod provider;

pub use model::{
    CollectionScope, Discriminator, EntityModel, FieldType, MappingDescriptor,
    PropertyConversion, VirtualProperty,
};
pub use provider::{PropertyMap, SchemaProvider, StaticSchema};

use thiserror::Error as ThisError;

///
/// SchemaError
///
/// Missing or inconsistent metadata detected during compilation.
/// Raised at the point of lookup and propagated unchanged; the compiler
/// never falls back to a guessed collection or key.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum SchemaError {
    #[error("unknown entity '{entity}'")]
    UnknownEntity { entity: String },

    #[error("no property mapping registered for '{source}' -> '{target}'")]
    UnknownMapping { r#source: String, target: String },
}
