//! Error types shared across the application.

use std::fmt::{Display, Formatter};

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::models::jsonrpc::error_codes;

/// Shared application result type.
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error enumeration covering all domain failure modes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    /// Configuration parsing or validation failure.
    Config(String),
    /// File-system, socket, or other I/O failure.
    Io(String),
    /// Malformed input or input that fails a tool's schema.
    Validation(String),
    /// Unknown tool name or unmatched route.
    NotFound(String),
    /// Session transport misuse: wrong content type, oversized body,
    /// or an operation on a transport that is not streaming.
    Transport(String),
    /// Inbound session message that does not satisfy the JSON-RPC shape.
    ProtocolParse(String),
    /// A tool implementation failed.
    Handler(String),
}

impl AppError {
    /// Bare message text, without the kind prefix used by `Display`.
    ///
    /// This is what clients see in `{ "error": ... }` bodies.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Config(msg)
            | Self::Io(msg)
            | Self::Validation(msg)
            | Self::NotFound(msg)
            | Self::Transport(msg)
            | Self::ProtocolParse(msg)
            | Self::Handler(msg) => msg,
        }
    }

    /// HTTP status reflecting the error taxonomy.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::Transport(_) | Self::ProtocolParse(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Config(_) | Self::Io(_) | Self::Handler(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// JSON-RPC error code used when the error is reported on a session stream.
    #[must_use]
    pub fn jsonrpc_code(&self) -> i32 {
        match self {
            Self::Validation(_) | Self::NotFound(_) => error_codes::INVALID_PARAMS,
            Self::ProtocolParse(_) => error_codes::INVALID_REQUEST,
            Self::Config(_) | Self::Io(_) | Self::Transport(_) | Self::Handler(_) => {
                error_codes::INTERNAL_ERROR
            }
        }
    }
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "config: {msg}"),
            Self::Io(msg) => write!(f, "io: {msg}"),
            Self::Validation(msg) => write!(f, "validation: {msg}"),
            Self::NotFound(msg) => write!(f, "not found: {msg}"),
            Self::Transport(msg) => write!(f, "transport: {msg}"),
            Self::ProtocolParse(msg) => write!(f, "protocol: {msg}"),
            Self::Handler(msg) => write!(f, "handler: {msg}"),
        }
    }
}

impl std::error::Error for AppError {}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(format!("invalid config: {err}"))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = serde_json::json!({ "error": self.message() });
        (status, Json(body)).into_response()
    }
}
