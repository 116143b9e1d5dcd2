use crate::{
    SchemaError,
    model::{CollectionScope, Discriminator, EntityModel, MappingDescriptor, VirtualProperty},
};

///
/// SchemaProvider
///
/// Lookup surface the compiler consumes. Implementations must be pure and
/// cheap: every visitor pass queries the provider repeatedly during one
/// compile call, and providers are shared across concurrent compiles.
///

pub trait SchemaProvider: Send + Sync {
    /// Resolve the model for an entity type tag.
    fn entity(&self, entity: &str) -> Result<&EntityModel, SchemaError>;

    /// Mappings registered for a (source entity, target view) pair.
    fn property_mappings(&self, source: &str, target: &str) -> Result<&[MappingDescriptor], SchemaError>;

    // ------------------------------------------------------------------
    // Derived lookups
    // ------------------------------------------------------------------

    fn collection_name(&self, entity: &str, scope: CollectionScope) -> Result<&'static str, SchemaError> {
        Ok(self.entity(entity)?.collection(scope))
    }

    fn primary_key_field(&self, entity: &str) -> Result<&'static str, SchemaError> {
        Ok(self.entity(entity)?.primary_key)
    }

    fn type_discriminator(&self, entity: &str) -> Result<Option<Discriminator>, SchemaError> {
        Ok(self.entity(entity)?.discriminator)
    }

    fn serialized_name(&self, entity: &str, field: &str) -> Result<Option<&'static str>, SchemaError> {
        Ok(self.entity(entity)?.serialized_name(field))
    }

    fn virtual_property(&self, entity: &str, field: &str) -> Result<Option<&VirtualProperty>, SchemaError> {
        Ok(self.entity(entity)?.virtual_property(field))
    }
}

///
/// PropertyMap
///
/// Static registration of the mappings for one view conversion.
///

#[derive(Clone, Copy, Debug)]
pub struct PropertyMap {
    pub source: &'static str,
    pub target: &'static str,
    pub properties: &'static [MappingDescriptor],
}

///
/// StaticSchema
///
/// Table-backed provider over `&'static` models. This is both the
/// production registry (populated by the model-registration layer) and
/// the fixture vehicle for tests.
///

#[derive(Clone, Copy, Debug)]
pub struct StaticSchema {
    entities: &'static [&'static EntityModel],
    mappings: &'static [PropertyMap],
}

impl StaticSchema {
    #[must_use]
    pub const fn new(
        entities: &'static [&'static EntityModel],
        mappings: &'static [PropertyMap],
    ) -> Self {
        Self { entities, mappings }
    }
}

impl SchemaProvider for StaticSchema {
    fn entity(&self, entity: &str) -> Result<&EntityModel, SchemaError> {
        self.entities
            .iter()
            .find(|model| model.entity_name == entity)
            .map(|model| &**model)
            .ok_or_else(|| SchemaError::UnknownEntity {
                entity: entity.to_string(),
            })
    }

    fn property_mappings(&self, source: &str, target: &str) -> Result<&[MappingDescriptor], SchemaError> {
        self.mappings
            .iter()
            .find(|map| map.source == source && map.target == target)
            .map(|map| map.properties)
            .ok_or_else(|| SchemaError::UnknownMapping {
                source: source.to_string(),
                target: target.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PropertyConversion;

    static PERSON: EntityModel = EntityModel {
        entity_name: "Person",
        query_collection: "PersonQuery",
        command_collection: "Person",
        primary_key: "Id",
        discriminator: Some(Discriminator {
            field: "Kind",
            value: "Person",
        }),
        serialized_names: &[("DisplayName", "displayName")],
        field_types: &[("Name", crate::model::FieldType::Text)],
        virtual_properties: &[VirtualProperty {
            name: "Functions",
            backing_path: "Assignments",
            list_filter: Some("CURRENT.Kind == \"Function\""),
            conversion: Some(PropertyConversion::Count),
        }],
    };

    static SCHEMA: StaticSchema = StaticSchema::new(&[&PERSON], &[]);

    #[test]
    fn entity_lookup_resolves_scoped_collections() {
        let model = SCHEMA.entity("Person").unwrap();
        assert_eq!(model.collection(CollectionScope::Query), "PersonQuery");
        assert_eq!(model.collection(CollectionScope::Command), "Person");
    }

    #[test]
    fn unknown_entity_is_a_schema_error() {
        let err = SCHEMA.entity("Ghost").unwrap_err();
        assert_eq!(
            err,
            SchemaError::UnknownEntity {
                entity: "Ghost".to_string()
            }
        );
    }

    #[test]
    fn serialized_name_only_reports_overrides() {
        let model = SCHEMA.entity("Person").unwrap();
        assert_eq!(model.serialized_name("DisplayName"), Some("displayName"));
        assert_eq!(model.serialized_name("Name"), None);
    }

    #[test]
    fn virtual_property_lookup_by_name() {
        let model = SCHEMA.entity("Person").unwrap();
        let vp = model.virtual_property("Functions").unwrap();
        assert_eq!(vp.backing_path, "Assignments");
        assert_eq!(vp.conversion, Some(PropertyConversion::Count));
    }

    #[test]
    fn missing_mapping_is_a_schema_error() {
        let err = SCHEMA.property_mappings("Person", "PersonView").unwrap_err();
        assert_eq!(
            err,
            SchemaError::UnknownMapping {
                source: "Person".to_string(),
                target: "PersonView".to_string()
            }
        );
    }
}
