use serde_json::json;

use toolhost::models::schema::Schema;
use toolhost::schema::{from_json_schema, translate};
use toolhost::tools::{adapt, sync_handler, InvocationArgs, Tool, ToolRegistry};

fn weather_document() -> serde_json::Value {
    json!({
        "type": "object",
        "description": "Forecast lookup",
        "properties": {
            "city": {"type": "string", "description": "City name"},
            "days": {"type": "integer"},
            "units": {"type": "string", "enum": ["metric", "imperial"]},
            "tags": {"type": "array", "items": {"type": "string"}}
        },
        "required": ["city", "days"]
    })
}

#[test]
fn adapter_preserves_property_order() {
    let schema = from_json_schema(&weather_document());
    let names: Vec<&str> = schema
        .fields()
        .expect("object schema")
        .iter()
        .map(|(name, _)| name.as_str())
        .collect();
    assert_eq!(names, ["city", "days", "units", "tags"]);
}

#[test]
fn adapted_schema_translates_to_description() {
    let schema = from_json_schema(&weather_document());
    let description = serde_json::to_value(translate(Some(&schema))).expect("serialize");

    assert_eq!(
        description,
        json!({
            "type": "object",
            "description": "Forecast lookup",
            "properties": {
                "city": {"type": "string", "description": "City name"},
                "days": {"type": "number", "description": "days"},
                "tags": {"type": "array", "description": "tags", "items": {"type": "string"}},
                "units": {"type": "string", "description": "units", "enum": ["metric", "imperial"]}
            },
            "required": ["city", "days"]
        })
    );
}

#[test]
fn adapted_schema_validates_input() {
    let schema = from_json_schema(&weather_document());

    let ok = schema.validate(&json!({"city": "Oslo", "days": 3, "extra": true}));
    assert_eq!(ok, Ok(json!({"city": "Oslo", "days": 3})));

    let missing = schema.validate(&json!({"city": "Oslo"}));
    assert!(missing.is_err());
}

#[test]
fn adapted_multi_field_schema_yields_positional_args() {
    let schema = from_json_schema(&weather_document());
    let validated = schema
        .validate(&json!({"days": 2, "city": "Lima"}))
        .expect("valid input");

    let args = adapt(Some(&schema), validated);
    assert_eq!(
        args,
        InvocationArgs::Positional(vec![
            json!("Lima"),
            json!(2),
            serde_json::Value::Null,
            serde_json::Value::Null
        ])
    );
}

#[test]
fn unknown_top_level_type_describes_empty_object() {
    let schema = from_json_schema(&json!({"type": "mystery"}));
    let description = serde_json::to_value(translate(Some(&schema))).expect("serialize");
    assert_eq!(description, json!({"type": "object", "properties": {}}));
}

#[test]
fn registry_serves_adapted_schema() {
    let tool = Tool::new("weather", sync_handler(|_| Ok(json!("sunny"))))
        .with_schema(from_json_schema(&weather_document()));
    let registry = ToolRegistry::builder().tool(tool).build();

    let definitions = registry.definitions();
    let weather = definitions.get("weather").expect("weather registered");
    assert_eq!(weather.description, "Tool: weather");
    assert_eq!(
        weather.input_schema.required.as_deref(),
        Some(["city".to_owned(), "days".to_owned()].as_slice())
    );
}

#[test]
fn builder_and_adapter_agree() {
    let built = Schema::object()
        .field("name", Schema::string().describe("Who to greet"));
    let adapted = from_json_schema(&json!({
        "type": "object",
        "properties": {"name": {"type": "string", "description": "Who to greet"}},
        "required": ["name"]
    }));
    assert_eq!(built, adapted);
}
