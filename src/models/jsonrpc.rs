//! JSON-RPC 2.0 message types for the session transport.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::{AppError, Result};

/// Protocol version string carried by every message.
pub const JSONRPC_VERSION: &str = "2.0";

/// Standard JSON-RPC error codes.
pub mod error_codes {
    /// Invalid JSON was received.
    pub const PARSE_ERROR: i32 = -32700;
    /// The JSON sent is not a valid Request object.
    pub const INVALID_REQUEST: i32 = -32600;
    /// The method does not exist.
    pub const METHOD_NOT_FOUND: i32 = -32601;
    /// Invalid method parameter(s).
    pub const INVALID_PARAMS: i32 = -32602;
    /// Internal JSON-RPC error.
    pub const INTERNAL_ERROR: i32 = -32603;
}

/// Request ID can be a number, a string, or an explicit `null`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    /// Numeric ID.
    Number(i64),
    /// String ID.
    String(String),
    /// `"id": null`, as sent on error replies to unreadable requests.
    Null,
}

/// JSON-RPC 2.0 error object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    /// Error code.
    pub code: i32,
    /// Human-readable message.
    pub message: String,
    /// Optional structured data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Any JSON-RPC 2.0 message: request, notification, or response.
///
/// Deserializing only checks field types; call [`JsonRpcMessage::kind`]
/// (or use [`JsonRpcMessage::parse`]) to check the message shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcMessage {
    /// Protocol version, always "2.0".
    pub jsonrpc: String,
    /// Correlation ID; absent on notifications.
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<RequestId>,
    /// Method name on requests and notifications.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    /// Method parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    /// Success payload on responses; `Some(Value::Null)` for `"result": null`.
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub result: Option<Value>,
    /// Failure payload on responses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

/// A key that is present deserializes to `Some`, even when its value is `null`.
fn present<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Shape of a well-formed message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    /// Method call expecting a response.
    Request,
    /// Method call without an id.
    Notification,
    /// Successful reply.
    Response,
    /// Failed reply.
    ErrorResponse,
}

impl JsonRpcMessage {
    /// Parse and shape-check a message from raw JSON.
    ///
    /// # Errors
    ///
    /// Returns `AppError::ProtocolParse` when the value is not a single
    /// well-formed JSON-RPC 2.0 message.
    pub fn parse(value: Value) -> Result<Self> {
        if !value.is_object() {
            return Err(AppError::ProtocolParse(
                "message must be a JSON object".into(),
            ));
        }
        let message: Self = serde_json::from_value(value)
            .map_err(|err| AppError::ProtocolParse(format!("invalid message: {err}")))?;
        message.kind()?;
        Ok(message)
    }

    /// Classify the message, rejecting ambiguous or incomplete shapes.
    ///
    /// # Errors
    ///
    /// Returns `AppError::ProtocolParse` when the shape matches no kind.
    pub fn kind(&self) -> Result<MessageKind> {
        if self.jsonrpc != JSONRPC_VERSION {
            return Err(AppError::ProtocolParse(format!(
                "unsupported jsonrpc version '{}'",
                self.jsonrpc
            )));
        }

        match (&self.method, &self.id, &self.result, &self.error) {
            (Some(_), _, None, None) if self.id.is_some() => Ok(MessageKind::Request),
            (Some(_), None, None, None) => Ok(MessageKind::Notification),
            (None, Some(_), Some(_), None) => Ok(MessageKind::Response),
            (None, Some(_), None, Some(_)) => Ok(MessageKind::ErrorResponse),
            (Some(_), ..) => Err(AppError::ProtocolParse(
                "request must not carry result or error".into(),
            )),
            (None, None, ..) => Err(AppError::ProtocolParse(
                "message has neither method nor id".into(),
            )),
            (None, Some(_), ..) => Err(AppError::ProtocolParse(
                "response must carry exactly one of result or error".into(),
            )),
        }
    }

    /// Build a request.
    #[must_use]
    pub fn request(id: RequestId, method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.into(),
            id: Some(id),
            method: Some(method.into()),
            params,
            result: None,
            error: None,
        }
    }

    /// Build a notification.
    #[must_use]
    pub fn notification(method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.into(),
            id: None,
            method: Some(method.into()),
            params,
            result: None,
            error: None,
        }
    }

    /// Build a success response.
    #[must_use]
    pub fn success(id: RequestId, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.into(),
            id: Some(id),
            method: None,
            params: None,
            result: Some(result),
            error: None,
        }
    }

    /// Build an error response.
    #[must_use]
    pub fn failure(id: RequestId, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.into(),
            id: Some(id),
            method: None,
            params: None,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
                data: None,
            }),
        }
    }

    /// Build an error response from an application error.
    #[must_use]
    pub fn from_error(id: RequestId, err: &AppError) -> Self {
        Self::failure(id, err.jsonrpc_code(), err.message())
    }
}
