use serde::Serialize;

///
/// CollectionScope
///
/// Selects which of the two physical collections a lookup resolves to.
/// Directory entities are double-written: a query-optimized collection
/// serves reads, a command collection serves the write path.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub enum CollectionScope {
    Query,
    Command,
}

///
/// EntityModel
///
/// Static runtime model for one directory entity type. All metadata the
/// compiler consumes is resolved through this structure; it carries no
/// behavior of its own.
///

#[derive(Clone, Debug, Serialize)]
pub struct EntityModel {
    /// Stable external name used for alias seeding and diagnostics.
    pub entity_name: &'static str,
    /// Collection served to the read/query path.
    pub query_collection: &'static str,
    /// Collection served to the write/command path.
    pub command_collection: &'static str,
    /// Primary key field; always appended as the sort tie-break.
    pub primary_key: &'static str,
    /// Polymorphic type discriminator, if the collection is shared.
    pub discriminator: Option<Discriminator>,
    /// Field-name to wire-name overrides for projections.
    pub serialized_names: &'static [(&'static str, &'static str)],
    /// Declared literal types for fields that require cast checks.
    pub field_types: &'static [(&'static str, FieldType)],
    /// Schema-declared computed fields with backing expressions.
    pub virtual_properties: &'static [VirtualProperty],
}

impl EntityModel {
    /// Resolve the collection name for the given scope.
    #[must_use]
    pub const fn collection(&self, scope: CollectionScope) -> &'static str {
        match scope {
            CollectionScope::Query => self.query_collection,
            CollectionScope::Command => self.command_collection,
        }
    }

    /// Wire name override for a field, if one is declared.
    #[must_use]
    pub fn serialized_name(&self, field: &str) -> Option<&'static str> {
        self.serialized_names
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, wire)| *wire)
    }

    /// Look up a virtual property declared on this entity.
    #[must_use]
    pub fn virtual_property(&self, name: &str) -> Option<&VirtualProperty> {
        self.virtual_properties.iter().find(|vp| vp.name == name)
    }

    /// Declared literal type for a field, if the model constrains one.
    #[must_use]
    pub fn field_type(&self, field: &str) -> Option<FieldType> {
        self.field_types
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, ty)| *ty)
    }
}

///
/// FieldType
///
/// Declared literal type for a queryable field. Supplied literals are
/// structurally cast to this type before lowering; a failed cast is a
/// validation error, never a silent passthrough.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub enum FieldType {
    Text,
    Int,
    Uint,
    Float,
    Bool,
    Timestamp,
}

///
/// Discriminator
///
/// Field/value pair identifying this entity type inside a shared
/// collection (`Kind == "Group"` and friends).
///

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct Discriminator {
    pub field: &'static str,
    pub value: &'static str,
}

///
/// VirtualProperty
///
/// A computed field with a backing member path. An optional inline list
/// filter narrows the backing collection before the conversion is applied
/// (e.g. "Functions" = assignments narrowed to kind Function, counted).
///

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct VirtualProperty {
    pub name: &'static str,
    /// Member path the property expands to, relative to the entity root.
    pub backing_path: &'static str,
    /// Inline `[* FILTER ...]` predicate over `CURRENT`, if declared.
    pub list_filter: Option<&'static str>,
    /// Conversion wrapper applied before the comparison operator.
    pub conversion: Option<PropertyConversion>,
}

///
/// PropertyConversion
///

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub enum PropertyConversion {
    Count,
}

///
/// MappingDescriptor
///
/// One cross-collection projection rule for an activated view conversion:
/// resolve ids stored under `source_prop` against `resolving_entity` and
/// project `projected_fields` into `target_prop` of the merged output.
///
/// Mappings are registered statically per (source entity, target view)
/// pair; there is no runtime mapper instantiation.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct MappingDescriptor {
    pub source_prop: &'static str,
    pub target_prop: &'static str,
    pub resolving_entity: &'static str,
    /// (wire name, source field on the resolving entity) pairs.
    pub projected_fields: &'static [(&'static str, &'static str)],
}
