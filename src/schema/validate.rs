//! Input validation against the schema IR.

use serde_json::{Map, Value};

use crate::models::schema::Schema;
use crate::{AppError, Result};

impl Schema {
    /// Validate `value`, returning the validated copy.
    ///
    /// Undeclared object keys are stripped and absent optional fields are
    /// left out, so the output only carries what the schema declares.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` listing every failing path.
    pub fn validate(&self, value: &Value) -> Result<Value> {
        let mut issues = Vec::new();
        let validated = check(self, value, "", &mut issues);
        if issues.is_empty() {
            Ok(validated)
        } else {
            Err(AppError::Validation(issues.join("; ")))
        }
    }
}

fn check(schema: &Schema, value: &Value, path: &str, issues: &mut Vec<String>) -> Value {
    match schema {
        Schema::Optional(inner) => {
            if value.is_null() {
                Value::Null
            } else {
                check(inner, value, path, issues)
            }
        }
        Schema::Object { fields, .. } => {
            let Some(map) = value.as_object() else {
                issues.push(mismatch(path, "object", value));
                return Value::Null;
            };
            let mut out = Map::new();
            for (name, field) in fields {
                let field_path = join(path, name);
                match map.get(name) {
                    None | Some(Value::Null) if field.is_optional() => {}
                    None => issues.push(format!("{field_path}: required")),
                    Some(inner) => {
                        out.insert(name.clone(), check(field, inner, &field_path, issues));
                    }
                }
            }
            Value::Object(out)
        }
        Schema::String { .. } => expect(value.is_string(), path, "string", value, issues),
        Schema::Number { .. } => expect(value.is_number(), path, "number", value, issues),
        Schema::Boolean { .. } => expect(value.is_boolean(), path, "boolean", value, issues),
        Schema::Array { items, .. } => {
            let Some(elements) = value.as_array() else {
                issues.push(mismatch(path, "array", value));
                return Value::Null;
            };
            Value::Array(
                elements
                    .iter()
                    .enumerate()
                    .map(|(index, element)| {
                        check(items, element, &format!("{path}[{index}]"), issues)
                    })
                    .collect(),
            )
        }
        Schema::Enum { values, .. } => match value.as_str() {
            Some(text) if values.iter().any(|allowed| allowed == text) => value.clone(),
            _ => {
                let allowed = values
                    .iter()
                    .map(|allowed| format!("'{allowed}'"))
                    .collect::<Vec<_>>()
                    .join(", ");
                issues.push(format!(
                    "{}expected one of {allowed}, received {value}",
                    prefix(path)
                ));
                Value::Null
            }
        },
        Schema::Other { .. } => value.clone(),
    }
}

fn expect(ok: bool, path: &str, expected: &str, value: &Value, issues: &mut Vec<String>) -> Value {
    if ok {
        value.clone()
    } else {
        issues.push(mismatch(path, expected, value));
        Value::Null
    }
}

fn mismatch(path: &str, expected: &str, value: &Value) -> String {
    format!(
        "{}expected {expected}, received {}",
        prefix(path),
        type_name(value)
    )
}

fn prefix(path: &str) -> String {
    if path.is_empty() {
        String::new()
    } else {
        format!("{path}: ")
    }
}

fn join(path: &str, name: &str) -> String {
    if path.is_empty() {
        name.to_owned()
    } else {
        format!("{path}.{name}")
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
