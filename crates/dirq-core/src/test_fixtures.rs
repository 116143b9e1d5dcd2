//! Shared static schema fixtures for unit tests.

use dirq_schema::{
    Discriminator, EntityModel, FieldType, MappingDescriptor, PropertyConversion, PropertyMap,
    StaticSchema, VirtualProperty,
};

pub(crate) static GROUP: EntityModel = EntityModel {
    entity_name: "Group",
    query_collection: "GroupQuery",
    command_collection: "Group",
    primary_key: "Id",
    discriminator: Some(Discriminator {
        field: "Kind",
        value: "Group",
    }),
    serialized_names: &[("DisplayName", "displayName")],
    field_types: &[("MemberCount", FieldType::Int), ("Name", FieldType::Text)],
    virtual_properties: &[VirtualProperty {
        name: "Functions",
        backing_path: "Assignments",
        list_filter: Some("CURRENT.Kind == \"Function\""),
        conversion: Some(PropertyConversion::Count),
    }],
};

pub(crate) static PERSON: EntityModel = EntityModel {
    entity_name: "Person",
    query_collection: "PersonQuery",
    command_collection: "Person",
    primary_key: "Id",
    discriminator: Some(Discriminator {
        field: "Kind",
        value: "Person",
    }),
    serialized_names: &[("DisplayName", "displayName")],
    field_types: &[("Name", FieldType::Text)],
    virtual_properties: &[],
};

/// Entity without a discriminator: filtering is skipped entirely when no
/// conditions are registered.
pub(crate) static ORG_UNIT: EntityModel = EntityModel {
    entity_name: "OrgUnit",
    query_collection: "OrgUnits",
    command_collection: "OrgUnits",
    primary_key: "Id",
    discriminator: None,
    serialized_names: &[],
    field_types: &[],
    virtual_properties: &[],
};

static MAPPINGS: &[PropertyMap] = &[PropertyMap {
    source: "Group",
    target: "GroupMemberView",
    properties: &[MappingDescriptor {
        source_prop: "Members",
        target_prop: "ResolvedMembers",
        resolving_entity: "Person",
        projected_fields: &[("displayName", "DisplayName"), ("name", "Name")],
    }],
}];

pub(crate) static SCHEMA: StaticSchema =
    StaticSchema::new(&[&GROUP, &PERSON, &ORG_UNIT], MAPPINGS);
