//! Schema IR to portable schema description.

use std::collections::BTreeMap;

use crate::models::schema::{Schema, SchemaDescription, SchemaType};

/// Translate a tool's schema into the description served to clients.
///
/// Absent schemas, and schemas whose top-level discriminator was not
/// recognized, describe an empty object. Pure and deterministic.
#[must_use]
pub fn translate(schema: Option<&Schema>) -> SchemaDescription {
    match schema {
        None | Some(Schema::Other { .. }) => SchemaDescription::empty_object(),
        Some(schema) => translate_node(schema, None),
    }
}

/// Translate one node. `field` is the property name when the node is an
/// object field; it stands in for a missing description.
fn translate_node(schema: &Schema, field: Option<&str>) -> SchemaDescription {
    let described = |kind: SchemaType, description: Option<&str>| SchemaDescription {
        description: description.or(field).map(str::to_owned),
        ..SchemaDescription::of(kind)
    };

    match schema {
        Schema::Optional(inner) => translate_node(inner, field),
        Schema::Object {
            fields,
            description,
        } => {
            let mut properties = BTreeMap::new();
            let mut required = Vec::new();
            for (name, value) in fields {
                if !value.is_optional() {
                    required.push(name.clone());
                }
                properties.insert(name.clone(), translate_node(value, Some(name)));
            }
            SchemaDescription {
                properties: Some(properties),
                required: (!required.is_empty()).then_some(required),
                ..described(SchemaType::Object, description.as_deref())
            }
        }
        Schema::String { description } => described(SchemaType::String, description.as_deref()),
        Schema::Number { description } => described(SchemaType::Number, description.as_deref()),
        Schema::Boolean { description } => described(SchemaType::Boolean, description.as_deref()),
        Schema::Array { items, description } => SchemaDescription {
            items: Some(Box::new(translate_node(items, None))),
            ..described(SchemaType::Array, description.as_deref())
        },
        Schema::Enum {
            values,
            description,
        } => SchemaDescription {
            enum_values: Some(values.clone()),
            ..described(SchemaType::String, description.as_deref())
        },
        Schema::Other { .. } => described(SchemaType::String, None),
    }
}
