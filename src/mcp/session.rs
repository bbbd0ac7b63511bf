//! Per-session request routing.
//!
//! A [`SessionRouter`] is owned by exactly one session actor, so it takes
//! `&mut self` and needs no locking of its own.

use std::sync::Arc;

use axum::extract::Request;
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::{debug, info};

use super::server::McpServer;
use super::transport::{SseTransport, TransportHandler, TransportOptions, TransportState};
use crate::config::GlobalConfig;
use crate::AppError;

/// Lifecycle of a session as seen from its router.
pub type SessionState = TransportState;

/// Routing settings shared by every session.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    /// Suffix of the stream-opening GET path.
    pub sse_path: String,
    /// Suffix of the message POST path; also the endpoint announced to clients.
    pub message_path: String,
    /// Limits applied to each transport.
    pub transport: TransportOptions,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::from(&GlobalConfig::default())
    }
}

impl From<&GlobalConfig> for SessionSettings {
    fn from(config: &GlobalConfig) -> Self {
        Self {
            sse_path: config.streaming.sse_path.clone(),
            message_path: config.streaming.message_path.clone(),
            transport: TransportOptions::from(&config.streaming),
        }
    }
}

/// Routes one session's HTTP traffic to its transport.
pub struct SessionRouter {
    session_id: String,
    settings: Arc<SessionSettings>,
    server_name: Arc<str>,
    handler: Arc<dyn TransportHandler>,
    transport: Option<Arc<SseTransport>>,
}

impl SessionRouter {
    /// Router for `session_id` whose messages are answered by `server`.
    #[must_use]
    pub fn new(session_id: impl Into<String>, settings: Arc<SessionSettings>, server: McpServer) -> Self {
        let name = Arc::from(server.name());
        Self::with_handler(session_id, settings, name, Arc::new(server))
    }

    /// Router for `session_id` reporting transport events to `handler`.
    #[must_use]
    pub fn with_handler(
        session_id: impl Into<String>,
        settings: Arc<SessionSettings>,
        server_name: Arc<str>,
        handler: Arc<dyn TransportHandler>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            settings,
            server_name,
            handler,
            transport: None,
        }
    }

    /// Session identifier.
    #[must_use]
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Current session state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.transport
            .as_ref()
            .map_or(SessionState::Unopened, |transport| transport.state())
    }

    /// Resolves when the current transport closes; pending while none exists.
    pub async fn closed(&self) {
        match &self.transport {
            Some(transport) => transport.closed().await,
            None => std::future::pending().await,
        }
    }

    /// Route one request.
    pub async fn handle(&mut self, request: Request) -> Response {
        let method = request.method().clone();
        let path = request.uri().path().to_owned();

        if method == Method::GET && path.ends_with(&self.settings.sse_path) {
            return self.open_stream();
        }

        if method == Method::POST && path.ends_with(&self.settings.message_path) {
            return match &self.transport {
                Some(transport) => transport.handle_post_message(request).await,
                None => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "SSE connection not established",
                )
                    .into_response(),
            };
        }

        if method == Method::GET && path == "/" {
            return Json(json!({
                "status": "ready",
                "server": &*self.server_name,
            }))
            .into_response();
        }

        debug!(session_id = %self.session_id, %method, %path, "no session route");
        AppError::NotFound(format!("No route for {method} {path}")).into_response()
    }

    /// Close the current transport, if any. The closed transport is kept so
    /// the session reports `Closed`.
    pub fn shutdown(&mut self) {
        if let Some(transport) = &self.transport {
            transport.close();
        }
    }

    fn open_stream(&mut self) -> Response {
        if let Some(previous) = self.transport.take() {
            if previous.state() == TransportState::Streaming {
                info!(session_id = %self.session_id, "replacing open stream");
            }
            previous.close();
        }

        let transport = SseTransport::new(
            self.session_id.clone(),
            self.settings.message_path.clone(),
            self.settings.transport.clone(),
            Arc::clone(&self.handler),
        );
        let response = match transport.start() {
            Ok(response) => response,
            Err(err) => return err.into_response(),
        };
        self.transport = Some(transport);
        response
    }
}

impl Drop for SessionRouter {
    fn drop(&mut self) {
        self.shutdown();
    }
}
