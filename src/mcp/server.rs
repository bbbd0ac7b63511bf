//! MCP method handling for session messages.
//!
//! [`McpServer`] answers requests arriving on a session transport. Each
//! request is handled on its own task so a slow tool never blocks the
//! session's inbound queue; replies go back over the same transport.

use std::sync::Arc;

use serde_json::{json, Value};
use tracing::{debug, info, warn};

use super::transport::{SseTransport, TransportHandler};
use crate::models::jsonrpc::{error_codes, JsonRpcMessage, MessageKind, RequestId};
use crate::models::tool::ToolArgs;
use crate::tools::{execute_request, ToolRegistry};
use crate::AppError;

/// Protocol revision reported by `initialize`.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// JSON-RPC front end over a shared tool registry.
#[derive(Debug, Clone)]
pub struct McpServer {
    name: Arc<str>,
    registry: Arc<ToolRegistry>,
}

impl McpServer {
    /// Serve `registry` under the given server name.
    #[must_use]
    pub fn new(name: impl Into<Arc<str>>, registry: Arc<ToolRegistry>) -> Self {
        Self {
            name: name.into(),
            registry,
        }
    }

    /// Name reported in `initialize`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Produce the reply for one inbound message.
    ///
    /// Returns `None` for notifications and responses, which get no reply.
    pub async fn handle(&self, message: JsonRpcMessage) -> Option<JsonRpcMessage> {
        match message.kind() {
            Ok(MessageKind::Request) => {}
            Ok(kind) => {
                debug!(?kind, method = message.method.as_deref().unwrap_or(""), "no reply needed");
                return None;
            }
            Err(err) => {
                warn!(%err, "dropping malformed message");
                return None;
            }
        }

        let JsonRpcMessage {
            id: Some(id),
            method: Some(method),
            params,
            ..
        } = message
        else {
            return None;
        };

        Some(self.respond(id, &method, params).await)
    }

    async fn respond(&self, id: RequestId, method: &str, params: Option<Value>) -> JsonRpcMessage {
        match method {
            "initialize" => JsonRpcMessage::success(
                id,
                json!({
                    "protocolVersion": PROTOCOL_VERSION,
                    "capabilities": { "tools": {} },
                    "serverInfo": {
                        "name": &*self.name,
                        "version": env!("CARGO_PKG_VERSION"),
                    },
                }),
            ),
            "ping" => JsonRpcMessage::success(id, json!({})),
            "tools/list" => JsonRpcMessage::success(id, json!({ "tools": self.registry.list() })),
            "tools/call" => self.call_tool(id, params).await,
            other => JsonRpcMessage::failure(
                id,
                error_codes::METHOD_NOT_FOUND,
                format!("Method not found: {other}"),
            ),
        }
    }

    async fn call_tool(&self, id: RequestId, params: Option<Value>) -> JsonRpcMessage {
        let request = match params.map(ToolArgs::from_value).transpose() {
            Ok(request) => request.unwrap_or_default(),
            Err(err) => return JsonRpcMessage::from_error(id, &err),
        };

        match execute_request(&self.registry, request).await {
            Ok(envelope) => match serde_json::to_value(envelope) {
                Ok(result) => JsonRpcMessage::success(id, result),
                Err(err) => JsonRpcMessage::from_error(
                    id,
                    &AppError::Handler(format!("failed to encode tool result: {err}")),
                ),
            },
            Err(err) => JsonRpcMessage::from_error(id, &err),
        }
    }
}

impl TransportHandler for McpServer {
    fn on_message(&self, transport: &Arc<SseTransport>, message: JsonRpcMessage) {
        let server = self.clone();
        let transport = Arc::clone(transport);
        tokio::spawn(async move {
            let Some(reply) = server.handle(message).await else {
                return;
            };
            if let Err(err) = transport.send(&reply).await {
                warn!(session_id = %transport.session_id(), %err, "failed to deliver reply");
            }
        });
    }

    fn on_error(&self, session_id: &str, err: &AppError) {
        debug!(session_id, %err, "session message rejected");
    }

    fn on_close(&self, session_id: &str) {
        info!(session_id, "session ended");
    }
}
