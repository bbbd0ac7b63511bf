//! Adapter from JSON Schema documents to the schema IR.

use serde_json::Value;

use crate::models::schema::Schema;

/// Read a JSON Schema document into the IR.
///
/// Supports `type`, `properties`, `required`, `items`, `enum` and
/// `description`. Properties keep document order; those not listed in
/// `required` become optional. A missing or unrecognized `type` yields
/// [`Schema::Other`] unless the shape implies one (`properties` → object,
/// string-valued `enum` → enumeration).
#[must_use]
pub fn from_json_schema(document: &Value) -> Schema {
    let Some(map) = document.as_object() else {
        return Schema::Other {
            kind: document.to_string(),
        };
    };

    let description = map
        .get("description")
        .and_then(Value::as_str)
        .map(str::to_owned);

    let schema = match (discriminator(document), string_enum(document)) {
        (Some("string") | None, Some(values)) => Schema::Enum {
            values,
            description: None,
        },
        (Some("object"), _) => object(document),
        (None, _) if map.contains_key("properties") => object(document),
        (Some("string"), None) => Schema::string(),
        (Some("number" | "integer"), _) => Schema::number(),
        (Some("boolean"), _) => Schema::boolean(),
        (Some("array"), _) => Schema::array(
            map.get("items")
                .map_or_else(|| Schema::Other { kind: "any".into() }, from_json_schema),
        ),
        (Some(kind), _) => Schema::Other { kind: kind.into() },
        (None, None) => Schema::Other {
            kind: "unspecified".into(),
        },
    };

    match description {
        Some(text) => schema.describe(text),
        None => schema,
    }
}

/// The `type` keyword; for a type list, the first non-null entry.
fn discriminator(document: &Value) -> Option<&str> {
    match document.get("type")? {
        Value::String(kind) => Some(kind),
        Value::Array(kinds) => kinds
            .iter()
            .filter_map(Value::as_str)
            .find(|kind| *kind != "null"),
        _ => None,
    }
}

fn string_enum(document: &Value) -> Option<Vec<String>> {
    document
        .get("enum")?
        .as_array()?
        .iter()
        .map(|value| value.as_str().map(str::to_owned))
        .collect()
}

fn object(document: &Value) -> Schema {
    let required: Vec<&str> = document
        .get("required")
        .and_then(Value::as_array)
        .map(|names| names.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    let mut schema = Schema::object();
    if let Some(properties) = document.get("properties").and_then(Value::as_object) {
        for (name, property) in properties {
            let field = from_json_schema(property);
            let field = if required.contains(&name.as_str()) {
                field
            } else {
                field.optional()
            };
            schema = schema.field(name.clone(), field);
        }
    }
    schema
}
