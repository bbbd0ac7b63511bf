//! Content envelope every tool result is normalized into.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Marker for the `"type": "text"` discriminator.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TextKind {
    /// Plain text block.
    Text,
}

/// A `{type: "text", text}` block.
///
/// Blocks carrying any other key deserialize as [`ContentBlock::Other`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct TextBlock {
    /// Always `"text"`.
    #[serde(rename = "type")]
    pub kind: TextKind,
    /// Block contents.
    pub text: String,
}

/// One entry of a [`ContentEnvelope`].
///
/// Handlers that return their own envelope may use block types this runtime
/// does not model; those pass through untouched as [`ContentBlock::Other`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ContentBlock {
    /// Text block.
    Text(TextBlock),
    /// Any other block shape.
    Other(Value),
}

impl ContentBlock {
    /// Build a text block.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(TextBlock {
            kind: TextKind::Text,
            text: text.into(),
        })
    }

    /// Text of a text block.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(block) => Some(&block.text),
            Self::Other(_) => None,
        }
    }
}

/// The uniform `{content: [...]}` result shape.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContentEnvelope {
    /// Ordered content blocks.
    pub content: Vec<ContentBlock>,
    /// Extra top-level keys a handler put on its own envelope (e.g. `isError`).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ContentEnvelope {
    /// Envelope holding a single text block.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentBlock::text(text)],
            extra: Map::new(),
        }
    }
}
