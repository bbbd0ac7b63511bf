//! Schema IR describing a tool's input, and the portable description it
//! translates to.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Typed input schema attached to a tool at registration time.
///
/// Object fields keep their declaration order, which drives positional
/// argument adaptation.
#[derive(Debug, Clone, PartialEq)]
pub enum Schema {
    /// Mapping with named, ordered fields.
    Object {
        /// Declared fields in declaration order.
        fields: Vec<(String, Schema)>,
        /// Optional human-readable description.
        description: Option<String>,
    },
    /// UTF-8 string.
    String {
        /// Optional human-readable description.
        description: Option<String>,
    },
    /// Any JSON number.
    Number {
        /// Optional human-readable description.
        description: Option<String>,
    },
    /// `true` or `false`.
    Boolean {
        /// Optional human-readable description.
        description: Option<String>,
    },
    /// Homogeneous list.
    Array {
        /// Element schema.
        items: Box<Schema>,
        /// Optional human-readable description.
        description: Option<String>,
    },
    /// One of a fixed set of strings.
    Enum {
        /// Permitted values.
        values: Vec<String>,
        /// Optional human-readable description.
        description: Option<String>,
    },
    /// Wrapper marking a field as not required.
    Optional(Box<Schema>),
    /// Discriminator an adapter did not recognize.
    Other {
        /// The raw discriminator, for diagnostics.
        kind: String,
    },
}

impl Schema {
    /// Empty object schema; add fields with [`Schema::field`].
    #[must_use]
    pub fn object() -> Self {
        Self::Object {
            fields: Vec::new(),
            description: None,
        }
    }

    /// String schema.
    #[must_use]
    pub fn string() -> Self {
        Self::String { description: None }
    }

    /// Number schema.
    #[must_use]
    pub fn number() -> Self {
        Self::Number { description: None }
    }

    /// Boolean schema.
    #[must_use]
    pub fn boolean() -> Self {
        Self::Boolean { description: None }
    }

    /// Array schema with the given element type.
    #[must_use]
    pub fn array(items: Schema) -> Self {
        Self::Array {
            items: Box::new(items),
            description: None,
        }
    }

    /// String enumeration.
    #[must_use]
    pub fn enumeration<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Enum {
            values: values.into_iter().map(Into::into).collect(),
            description: None,
        }
    }

    /// Append a field to an object schema. No-op on other variants.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, schema: Schema) -> Self {
        if let Self::Object { fields, .. } = &mut self {
            let name = name.into();
            fields.retain(|(existing, _)| *existing != name);
            fields.push((name, schema));
        }
        self
    }

    /// Mark this schema as optional when used as an object field.
    #[must_use]
    pub fn optional(self) -> Self {
        match self {
            Self::Optional(_) => self,
            other => Self::Optional(Box::new(other)),
        }
    }

    /// Attach a description. An optional wrapper forwards it to its inner schema.
    #[must_use]
    pub fn describe(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        match &mut self {
            Self::Object { description, .. }
            | Self::String { description }
            | Self::Number { description }
            | Self::Boolean { description }
            | Self::Array { description, .. }
            | Self::Enum { description, .. } => *description = Some(text),
            Self::Optional(inner) => {
                let described = std::mem::replace(inner.as_mut(), Self::string()).describe(text);
                **inner = described;
            }
            Self::Other { .. } => {}
        }
        self
    }

    /// Description attached to this schema, looking through optional wrappers.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        match self {
            Self::Object { description, .. }
            | Self::String { description }
            | Self::Number { description }
            | Self::Boolean { description }
            | Self::Array { description, .. }
            | Self::Enum { description, .. } => description.as_deref(),
            Self::Optional(inner) => inner.description(),
            Self::Other { .. } => None,
        }
    }

    /// Whether this schema is an optional wrapper.
    #[must_use]
    pub fn is_optional(&self) -> bool {
        matches!(self, Self::Optional(_))
    }

    /// Declared object fields, or `None` for non-object schemas.
    #[must_use]
    pub fn fields(&self) -> Option<&[(String, Schema)]> {
        match self {
            Self::Object { fields, .. } => Some(fields),
            _ => None,
        }
    }
}

/// Portable type names emitted in a [`SchemaDescription`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SchemaType {
    /// JSON object.
    Object,
    /// JSON string.
    String,
    /// JSON number.
    Number,
    /// JSON boolean.
    Boolean,
    /// JSON array.
    Array,
}

/// Library-agnostic description of a tool's input shape, as served to clients.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SchemaDescription {
    /// Portable type name.
    #[serde(rename = "type")]
    pub kind: SchemaType,
    /// Object properties keyed by name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, SchemaDescription>>,
    /// Required property names in declaration order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
    /// Element description for arrays.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaDescription>>,
    /// Permitted values for enumerations.
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
    /// Human-readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl SchemaDescription {
    /// Description with only a type name.
    #[must_use]
    pub fn of(kind: SchemaType) -> Self {
        Self {
            kind,
            properties: None,
            required: None,
            items: None,
            enum_values: None,
            description: None,
        }
    }

    /// `{type: "object", properties: {}}`, used for absent or unrecognized schemas.
    #[must_use]
    pub fn empty_object() -> Self {
        Self {
            properties: Some(BTreeMap::new()),
            ..Self::of(SchemaType::Object)
        }
    }
}
