//! Tool discovery and invocation payloads.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::schema::SchemaDescription;
use crate::{AppError, Result};

/// Discovery entry served by `GET /tool-definition` and `tools/list`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    /// Registered tool name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Portable description of the accepted input.
    pub input_schema: SchemaDescription,
}

/// Raw body of an execute request or the params of a `tools/call`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct ToolArgs {
    /// Tool to invoke.
    #[serde(default)]
    pub name: Option<String>,
    /// Tool input; takes precedence over `args`.
    #[serde(default)]
    pub arguments: Option<Value>,
    /// Synonym for `arguments`.
    #[serde(default)]
    pub args: Option<Value>,
}

impl ToolArgs {
    /// Parse from a JSON value.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` when the value is not an object or a
    /// field has the wrong type.
    pub fn from_value(value: Value) -> Result<Self> {
        if !value.is_object() {
            return Err(AppError::Validation(
                "request body must be a JSON object".into(),
            ));
        }
        serde_json::from_value(value)
            .map_err(|err| AppError::Validation(format!("invalid request body: {err}")))
    }

    /// Tool name, rejecting a missing or blank one.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` when no name was supplied.
    pub fn tool_name(&self) -> Result<&str> {
        match self.name.as_deref() {
            Some(name) if !name.trim().is_empty() => Ok(name),
            _ => Err(AppError::Validation("Tool name is required".into())),
        }
    }

    /// Resolved input: `arguments`, else `args`, else an empty mapping.
    #[must_use]
    pub fn into_input(self) -> Value {
        self.arguments
            .filter(|value| !value.is_null())
            .or(self.args.filter(|value| !value.is_null()))
            .unwrap_or_else(|| Value::Object(Map::new()))
    }
}
