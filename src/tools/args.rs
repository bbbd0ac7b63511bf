//! Adapting validated input to a handler's calling convention.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::models::schema::Schema;

/// Arguments a handler is invoked with.
#[derive(Debug, Clone, PartialEq)]
pub enum InvocationArgs {
    /// One value: the whole input, or the sole declared property.
    Single(Value),
    /// One value per declared property, in declaration order. Absent
    /// optional properties appear as `null`.
    Positional(Vec<Value>),
}

impl InvocationArgs {
    /// Number of arguments.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Positional(values) => values.len(),
        }
    }

    /// Whether there are no arguments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Argument at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Value> {
        match self {
            Self::Single(value) => (index == 0).then_some(value),
            Self::Positional(values) => values.get(index),
        }
    }

    /// All arguments as a list.
    #[must_use]
    pub fn into_vec(self) -> Vec<Value> {
        match self {
            Self::Single(value) => vec![value],
            Self::Positional(values) => values,
        }
    }

    /// Deserialize into a handler's parameter type.
    ///
    /// A single argument deserializes directly; positional arguments
    /// deserialize from a list, so a tuple `(A, B)` receives them in order.
    ///
    /// # Errors
    ///
    /// Returns the deserialization error when the shape does not fit `T`.
    pub fn parse<T: DeserializeOwned>(self) -> Result<T, serde_json::Error> {
        match self {
            Self::Single(value) => serde_json::from_value(value),
            Self::Positional(values) => serde_json::from_value(Value::Array(values)),
        }
    }
}

/// Decide how to invoke a handler given its schema and validated input.
///
/// - No schema: the input is passed through as one argument.
/// - Object schema with exactly one property: that property's value.
/// - Object schema with several properties: one value per property, in
///   declaration order.
/// - Anything else: the whole input as one argument.
#[must_use]
pub fn adapt(schema: Option<&Schema>, validated: Value) -> InvocationArgs {
    let fields = match schema.and_then(Schema::fields) {
        Some(fields) if !fields.is_empty() => fields,
        _ => return InvocationArgs::Single(validated),
    };

    let pick = |name: &str| validated.get(name).cloned().unwrap_or(Value::Null);

    match fields {
        [(name, _)] => InvocationArgs::Single(pick(name)),
        many => InvocationArgs::Positional(many.iter().map(|(name, _)| pick(name)).collect()),
    }
}
