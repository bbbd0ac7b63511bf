//! Top-level HTTP routing.
//!
//! `GET /tool-definition` and `POST /execute` are answered directly from the
//! registry; every other request, including other methods on those two
//! paths, is forwarded to the session layer. All
//! responses carry permissive CORS headers and `OPTIONS` preflights are
//! answered before routing.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Request, State};
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tracing::{debug, info};

use super::actor::{ActorHost, LocalActorHost, SessionKey};
use super::server::McpServer;
use super::session::SessionSettings;
use crate::config::{GlobalConfig, EXECUTE_PATH, TOOL_DEFINITION_PATH};
use crate::models::tool::ToolArgs;
use crate::tools::{execute_request, ToolRegistry};
use crate::AppError;

/// Shared state handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    /// Loaded configuration.
    pub config: Arc<GlobalConfig>,
    /// Registered tools.
    pub registry: Arc<ToolRegistry>,
    /// Session layer; `None` when streaming is disabled.
    pub sessions: Option<Arc<dyn ActorHost>>,
}

impl AppState {
    /// Build state for `config`, starting a local actor host when streaming
    /// is enabled.
    #[must_use]
    pub fn new(config: GlobalConfig, registry: ToolRegistry) -> Self {
        let registry = Arc::new(registry);
        let sessions = config.streaming.enabled.then(|| {
            let server = McpServer::new(config.server_name.as_str(), Arc::clone(&registry));
            Arc::new(LocalActorHost::new(SessionSettings::from(&config), server))
                as Arc<dyn ActorHost>
        });
        Self {
            config: Arc::new(config),
            registry,
            sessions,
        }
    }
}

/// Assemble the application router.
#[must_use]
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            TOOL_DEFINITION_PATH,
            get(tool_definitions).fallback(forward_to_session),
        )
        .route(EXECUTE_PATH, post(execute).fallback(forward_to_session))
        .fallback(forward_to_session)
        .layer(middleware::from_fn(cors))
        .with_state(state)
}

/// `GET /tool-definition`: map of tool name to definition.
async fn tool_definitions(State(state): State<AppState>) -> Response {
    Json(state.registry.definitions()).into_response()
}

/// `POST /execute`: run one tool synchronously.
async fn execute(State(state): State<AppState>, body: Bytes) -> Response {
    let outcome = async {
        let payload: serde_json::Value = serde_json::from_slice(&body)
            .map_err(|err| AppError::Validation(format!("Invalid JSON body: {err}")))?;
        let request = ToolArgs::from_value(payload)?;
        execute_request(&state.registry, request).await
    }
    .await;

    match outcome {
        Ok(envelope) => Json(envelope).into_response(),
        Err(err) => {
            info!(%err, "execute request failed");
            err.into_response()
        }
    }
}

/// Anything else belongs to a session.
async fn forward_to_session(State(state): State<AppState>, request: Request) -> Response {
    let Some(sessions) = state.sessions else {
        debug!(path = %request.uri().path(), "streaming disabled");
        return AppError::NotFound(format!("No route for {}", request.uri().path())).into_response();
    };
    let key = SessionKey::from_uri(request.uri());
    sessions.route(key, request).await
}

/// Answer preflights and stamp CORS headers on every response.
async fn cors(request: Request, next: Next) -> Response {
    let mut response = if request.method() == Method::OPTIONS {
        StatusCode::NO_CONTENT.into_response()
    } else {
        next.run(request).await
    };

    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type"),
    );
    response
}
