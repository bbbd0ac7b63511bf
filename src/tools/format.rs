//! Normalizing handler return values into a content envelope.

use serde_json::Value;

use crate::models::content::ContentEnvelope;

/// Text returned for handlers that produce no value.
pub const SUCCESS_TEXT: &str = "Operation completed successfully";

/// Coerce a handler's return value into a [`ContentEnvelope`].
///
/// - `{content: [...]}` is returned unchanged.
/// - A string becomes one text block.
/// - `null` becomes [`SUCCESS_TEXT`].
/// - Anything else is serialized to compact JSON in one text block.
///
/// Never fails.
#[must_use]
pub fn format(result: Value) -> ContentEnvelope {
    match result {
        Value::Null => ContentEnvelope::text(SUCCESS_TEXT),
        Value::String(text) => ContentEnvelope::text(text),
        Value::Object(ref map) if map.get("content").is_some_and(Value::is_array) => {
            let fallback = result.to_string();
            serde_json::from_value(result).unwrap_or_else(|_| ContentEnvelope::text(fallback))
        }
        other => ContentEnvelope::text(
            serde_json::to_string(&other).unwrap_or_else(|_| other.to_string()),
        ),
    }
}
