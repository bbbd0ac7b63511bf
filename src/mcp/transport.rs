//! Server-Sent-Events session transport.
//!
//! One [`SseTransport`] carries one session: server→client messages flow
//! as SSE frames on a long-lived GET response, client→server messages
//! arrive as individual POSTs addressed by `sessionId`.
//!
//! Lifecycle is `Unopened → Streaming → Closed`. Closing is idempotent and
//! fires [`TransportHandler::on_close`] exactly once, whether the server
//! closes the session or the client drops the stream.

use std::convert::Infallible;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::extract::Request;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, Interval};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::StreamingConfig;
use crate::models::jsonrpc::JsonRpcMessage;
use crate::{AppError, Result};

/// Comment frame written on keep-alive ticks.
const KEEP_ALIVE_FRAME: &[u8] = b": keep-alive\n\n";

/// Callbacks a transport reports inbound traffic and lifecycle events to.
pub trait TransportHandler: Send + Sync {
    /// A well-formed message arrived from the client.
    fn on_message(&self, transport: &Arc<SseTransport>, message: JsonRpcMessage);

    /// An inbound POST was rejected; the message was not delivered.
    fn on_error(&self, _session_id: &str, _err: &AppError) {}

    /// The transport closed. Called once per transport.
    fn on_close(&self, _session_id: &str) {}
}

/// Observable transport lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportState {
    /// Created, handshake not yet written.
    Unopened,
    /// Handshake written; messages may be sent.
    Streaming,
    /// Terminal.
    Closed,
}

/// Limits applied to one transport.
#[derive(Debug, Clone)]
pub struct TransportOptions {
    /// Maximum size of one POSTed message.
    pub max_message_bytes: usize,
    /// Outbound frame buffer.
    pub channel_capacity: usize,
    /// Keep-alive comment interval.
    pub keep_alive: Option<Duration>,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self::from(&StreamingConfig::default())
    }
}

impl From<&StreamingConfig> for TransportOptions {
    fn from(config: &StreamingConfig) -> Self {
        Self {
            max_message_bytes: config.max_message_bytes,
            channel_capacity: config.channel_capacity,
            keep_alive: config.keep_alive(),
        }
    }
}

enum Channel {
    Unopened,
    Streaming(mpsc::Sender<Bytes>),
    Closed,
}

/// SSE duplex channel for a single session.
pub struct SseTransport {
    session_id: String,
    message_path: String,
    options: TransportOptions,
    handler: Arc<dyn TransportHandler>,
    channel: Mutex<Channel>,
    closed: CancellationToken,
}

impl SseTransport {
    /// Create an unopened transport for `session_id` whose clients POST to `message_path`.
    #[must_use]
    pub fn new(
        session_id: impl Into<String>,
        message_path: impl Into<String>,
        options: TransportOptions,
        handler: Arc<dyn TransportHandler>,
    ) -> Arc<Self> {
        Arc::new(Self {
            session_id: session_id.into(),
            message_path: message_path.into(),
            options,
            handler,
            channel: Mutex::new(Channel::Unopened),
            closed: CancellationToken::new(),
        })
    }

    /// Session this transport belongs to.
    #[must_use]
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Callback URL announced in the handshake frame.
    #[must_use]
    pub fn endpoint_url(&self) -> String {
        format!("{}?sessionId={}", self.message_path, self.session_id)
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> TransportState {
        match *self.lock() {
            Channel::Unopened => TransportState::Unopened,
            Channel::Streaming(_) => TransportState::Streaming,
            Channel::Closed => TransportState::Closed,
        }
    }

    /// Resolves once the transport has closed.
    pub async fn closed(&self) {
        self.closed.cancelled().await;
    }

    /// Write the handshake frame and return the streaming response.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Transport` unless the transport is `Unopened`.
    pub fn start(self: &Arc<Self>) -> Result<Response> {
        let (tx, rx) = mpsc::channel::<Bytes>(self.options.channel_capacity.max(1));
        let handshake = format!("event: endpoint\ndata: {}\n\n", self.endpoint_url());

        {
            let mut channel = self.lock();
            match *channel {
                Channel::Unopened => {}
                Channel::Streaming(_) => {
                    return Err(AppError::Transport(
                        "SSE transport already started".into(),
                    ))
                }
                Channel::Closed => {
                    return Err(AppError::Transport("SSE transport is closed".into()))
                }
            }
            tx.try_send(Bytes::from(handshake))
                .map_err(|err| AppError::Transport(format!("failed to queue handshake: {err}")))?;
            *channel = Channel::Streaming(tx);
        }

        let disconnected = CancellationToken::new();
        let guard = disconnected.clone().drop_guard();
        let closed = self.closed.clone();

        let frames = futures_util::stream::unfold(
            (rx, guard, closed),
            |(mut rx, guard, closed)| async move {
                let frame = tokio::select! {
                    frame = rx.recv() => frame?,
                    () = closed.cancelled() => return None,
                };
                Some((Ok::<_, Infallible>(frame), (rx, guard, closed)))
            },
        );

        tokio::spawn(Arc::clone(self).watch(disconnected));
        info!(session_id = %self.session_id, "SSE stream opened");

        Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, "text/event-stream")
            .header(header::CACHE_CONTROL, "no-cache, no-transform")
            .header(header::CONNECTION, "keep-alive")
            .header("x-accel-buffering", "no")
            .body(Body::from_stream(frames))
            .map_err(|err| AppError::Transport(format!("failed to build SSE response: {err}")))
    }

    /// Send one message as an `event: message` frame.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Transport` when the transport is not streaming or
    /// closes before the frame is queued.
    pub async fn send(&self, message: &JsonRpcMessage) -> Result<()> {
        let json = serde_json::to_string(message)
            .map_err(|err| AppError::Transport(format!("failed to serialize message: {err}")))?;
        self.send_frame(Bytes::from(format!("event: message\ndata: {json}\n\n")))
            .await
    }

    /// Accept one client→server message.
    ///
    /// Responds `202 Accepted` after delivering the message to
    /// [`TransportHandler::on_message`], `500` when the stream is not open,
    /// and `400` with a plain-text reason for any rejected message, which is
    /// also reported to [`TransportHandler::on_error`].
    pub async fn handle_post_message(self: &Arc<Self>, request: Request) -> Response {
        if self.state() != TransportState::Streaming {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "SSE connection not established",
            )
                .into_response();
        }

        match self.ingest(request).await {
            Ok(message) => {
                debug!(
                    session_id = %self.session_id,
                    method = message.method.as_deref().unwrap_or(""),
                    "session message accepted"
                );
                self.handler.on_message(self, message);
                (StatusCode::ACCEPTED, "Accepted").into_response()
            }
            Err(err) => {
                warn!(session_id = %self.session_id, %err, "session message rejected");
                self.handler.on_error(&self.session_id, &err);
                (err.status(), err.message().to_owned()).into_response()
            }
        }
    }

    /// Move to `Closed`, release the stream, and fire the close callback
    /// if this call performed the transition.
    pub fn close(&self) {
        let previous = std::mem::replace(&mut *self.lock(), Channel::Closed);
        if matches!(previous, Channel::Closed) {
            return;
        }
        drop(previous);
        self.closed.cancel();
        info!(session_id = %self.session_id, "SSE transport closed");
        self.handler.on_close(&self.session_id);
    }

    async fn ingest(&self, request: Request) -> Result<JsonRpcMessage> {
        let (parts, body) = request.into_parts();
        check_content_type(&parts.headers)?;

        let limit = self.options.max_message_bytes;
        if let Some(length) = declared_length(&parts.headers)? {
            if length > limit {
                return Err(AppError::Transport(format!(
                    "message size {length} exceeds limit of {limit} bytes"
                )));
            }
        }

        let raw = to_bytes(body, limit).await.map_err(|err| {
            AppError::Transport(format!("failed to read message body: {err}"))
        })?;
        let value: serde_json::Value = serde_json::from_slice(&raw)
            .map_err(|err| AppError::ProtocolParse(format!("invalid JSON: {err}")))?;
        JsonRpcMessage::parse(value)
    }

    async fn send_frame(&self, frame: Bytes) -> Result<()> {
        let tx = match &*self.lock() {
            Channel::Streaming(tx) => tx.clone(),
            Channel::Unopened => {
                return Err(AppError::Transport("SSE transport not started".into()))
            }
            Channel::Closed => return Err(AppError::Transport("SSE transport is closed".into())),
        };

        tokio::select! {
            sent = tx.send(frame) => sent.map_err(|_| {
                self.close();
                AppError::Transport("SSE stream disconnected".into())
            }),
            () = self.closed.cancelled() => {
                Err(AppError::Transport("SSE transport is closed".into()))
            }
        }
    }

    /// Close on client disconnect and emit keep-alives while streaming.
    async fn watch(self: Arc<Self>, disconnected: CancellationToken) {
        let mut ticker = self.options.keep_alive.and_then(|period| {
            let start = Instant::now().checked_add(period);
            if start.is_none() {
                warn!(session_id = %self.session_id, ?period, "keep-alive interval out of range; disabled");
            }
            start.map(|start| interval_at(start, period))
        });

        loop {
            tokio::select! {
                () = disconnected.cancelled() => {
                    debug!(session_id = %self.session_id, "SSE client disconnected");
                    self.close();
                    break;
                }
                () = self.closed.cancelled() => break,
                () = tick(ticker.as_mut()) => {
                    if self.send_frame(Bytes::from_static(KEEP_ALIVE_FRAME)).await.is_err() {
                        break;
                    }
                }
            }
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Channel> {
        self.channel.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

async fn tick(ticker: Option<&mut Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending().await,
    }
}

fn check_content_type(headers: &HeaderMap) -> Result<()> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("");
    let essence = content_type.split(';').next().unwrap_or("").trim();
    if essence.eq_ignore_ascii_case("application/json") {
        Ok(())
    } else {
        Err(AppError::Transport(format!(
            "unsupported content-type: {content_type}"
        )))
    }
}

fn declared_length(headers: &HeaderMap) -> Result<Option<usize>> {
    let Some(value) = headers.get(header::CONTENT_LENGTH) else {
        return Ok(None);
    };
    value
        .to_str()
        .ok()
        .and_then(|text| text.trim().parse::<u64>().ok())
        .map(|length| Some(usize::try_from(length).unwrap_or(usize::MAX)))
        .ok_or_else(|| AppError::Transport("invalid content-length header".into()))
}
