//! Session actors.
//!
//! Every session is served by one task that owns its [`SessionRouter`] and
//! drains a mailbox of requests in arrival order. The host maps session ids
//! to mailboxes, mints ids for requests that arrive without one, and evicts
//! sessions that stay idle past a TTL. Only actors that opened a stream are
//! registered; any other request for an unknown id is served by a one-shot
//! actor.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use axum::extract::Request;
use axum::http::{header, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use uuid::Uuid;

use super::server::McpServer;
use super::session::{SessionRouter, SessionSettings};
use super::transport::TransportHandler;

/// Requests queued per actor before senders wait.
const MAILBOX_CAPACITY: usize = 32;

/// Query parameter naming the target session.
pub const SESSION_ID_PARAM: &str = "sessionId";

/// Which actor a request is addressed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionKey {
    /// An existing (or to-be-created) session.
    Named(String),
    /// No session given; a fresh id is minted.
    Fresh,
}

impl SessionKey {
    /// Read the `sessionId` query parameter.
    ///
    /// The value is used as-is, without URL decoding, so the id round-trips
    /// through the endpoint URL announced to the client. An empty value
    /// counts as absent.
    #[must_use]
    pub fn from_uri(uri: &Uri) -> Self {
        uri.query()
            .and_then(|query| {
                query
                    .split('&')
                    .filter_map(|pair| pair.split_once('='))
                    .find(|(key, _)| *key == SESSION_ID_PARAM)
                    .map(|(_, value)| value.to_owned())
                    .filter(|value| !value.is_empty())
            })
            .map_or(Self::Fresh, Self::Named)
    }
}

struct Envelope {
    request: Request,
    reply: oneshot::Sender<Response>,
}

/// Address of a running session actor.
pub struct ActorHandle {
    id: String,
    mailbox: mpsc::Sender<Envelope>,
    last_seen: Mutex<Instant>,
}

impl ActorHandle {
    /// Session id served by the actor.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Whether the actor is still draining its mailbox.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        !self.mailbox.is_closed()
    }

    /// Time since the last request was routed here.
    #[must_use]
    pub fn idle_for(&self) -> Duration {
        lock(&self.last_seen).elapsed()
    }

    /// Deliver `request` and wait for the actor's response.
    ///
    /// # Errors
    ///
    /// Hands the request back when the actor has already stopped.
    pub async fn call(&self, request: Request) -> Result<Response, Box<Request>> {
        *lock(&self.last_seen) = Instant::now();
        let (reply, response) = oneshot::channel();
        if let Err(mpsc::error::SendError(envelope)) =
            self.mailbox.send(Envelope { request, reply }).await
        {
            return Err(Box::new(envelope.request));
        }
        Ok(response.await.unwrap_or_else(|_| actor_stopped()))
    }
}

/// Places session actors and routes requests to them.
pub trait ActorHost: Send + Sync {
    /// Start an actor for `id` without registering it.
    fn create(&self, id: &str) -> Arc<ActorHandle>;

    /// Route one request to the actor for `key`.
    fn route(&self, key: SessionKey, request: Request) -> BoxFuture<'_, Response>;

    /// Drop registered actors that stopped or saw no request within `ttl`.
    /// Returns how many were removed.
    fn evict_idle(&self, ttl: Duration) -> usize;

    /// Drop every registered actor, closing their streams.
    fn shutdown(&self);

    /// Number of registered sessions.
    fn active_sessions(&self) -> usize;
}

/// In-process actor host backed by tokio tasks.
pub struct LocalActorHost {
    settings: Arc<SessionSettings>,
    server_name: Arc<str>,
    handler: Arc<dyn TransportHandler>,
    actors: Mutex<HashMap<String, Arc<ActorHandle>>>,
}

impl LocalActorHost {
    /// Host whose sessions answer with `server`.
    #[must_use]
    pub fn new(settings: SessionSettings, server: McpServer) -> Self {
        let name = Arc::from(server.name());
        Self::with_handler(settings, name, Arc::new(server))
    }

    /// Host whose session transports report to `handler`.
    #[must_use]
    pub fn with_handler(
        settings: SessionSettings,
        server_name: Arc<str>,
        handler: Arc<dyn TransportHandler>,
    ) -> Self {
        Self {
            settings: Arc::new(settings),
            server_name,
            handler,
            actors: Mutex::new(HashMap::new()),
        }
    }

    /// Live registered actor for `id`; a stopped one is forgotten.
    fn lookup(&self, id: &str) -> Option<Arc<ActorHandle>> {
        let mut actors = lock(&self.actors);
        match actors.get(id) {
            Some(handle) if handle.is_alive() => Some(Arc::clone(handle)),
            Some(_) => {
                actors.remove(id);
                None
            }
            None => None,
        }
    }

    async fn route_named(&self, id: &str, request: Request) -> Response {
        let request = match self.lookup(id) {
            Some(handle) => match handle.call(request).await {
                Ok(response) => return response,
                Err(request) => {
                    debug!(session_id = %id, "actor stopped before delivery");
                    *request
                }
            },
            None => request,
        };
        self.route_unregistered(id.to_owned(), request).await
    }

    /// Serve `request` on a new actor, keeping it only if a stream opened.
    async fn route_unregistered(&self, id: String, request: Request) -> Response {
        let handle = self.create(&id);
        let response = handle
            .call(request)
            .await
            .unwrap_or_else(|_| actor_stopped());

        if is_event_stream(&response) {
            debug!(session_id = %id, "registered session");
            lock(&self.actors).insert(id, handle);
        }
        response
    }
}

impl ActorHost for LocalActorHost {
    fn create(&self, id: &str) -> Arc<ActorHandle> {
        let (mailbox, inbox) = mpsc::channel(MAILBOX_CAPACITY);
        let router = SessionRouter::with_handler(
            id,
            Arc::clone(&self.settings),
            Arc::clone(&self.server_name),
            Arc::clone(&self.handler),
        );
        tokio::spawn(run(router, inbox));
        Arc::new(ActorHandle {
            id: id.to_owned(),
            mailbox,
            last_seen: Mutex::new(Instant::now()),
        })
    }

    fn route(&self, key: SessionKey, request: Request) -> BoxFuture<'_, Response> {
        async move {
            match key {
                SessionKey::Named(id) => self.route_named(&id, request).await,
                SessionKey::Fresh => {
                    self.route_unregistered(Uuid::new_v4().to_string(), request)
                        .await
                }
            }
        }
        .boxed()
    }

    fn evict_idle(&self, ttl: Duration) -> usize {
        let mut actors = lock(&self.actors);
        let before = actors.len();
        actors.retain(|id, handle| {
            let keep = handle.is_alive() && handle.idle_for() < ttl;
            if !keep {
                debug!(session_id = %id, "evicting session");
            }
            keep
        });
        before - actors.len()
    }

    fn shutdown(&self) {
        let drained = std::mem::take(&mut *lock(&self.actors));
        if !drained.is_empty() {
            info!(sessions = drained.len(), "closing sessions");
        }
    }

    fn active_sessions(&self) -> usize {
        lock(&self.actors).len()
    }
}

/// Actor loop: serve requests in order until the mailbox closes or the
/// session's stream ends.
async fn run(mut router: SessionRouter, mut inbox: mpsc::Receiver<Envelope>) {
    loop {
        let envelope = tokio::select! {
            envelope = inbox.recv() => envelope,
            () = router.closed() => None,
        };
        let Some(Envelope { request, reply }) = envelope else {
            break;
        };
        let response = router.handle(request).await;
        let _ = reply.send(response);
    }
    router.shutdown();
    debug!(session_id = %router.session_id(), "session actor stopped");
}

/// Spawn the background task that evicts idle sessions.
#[must_use]
pub fn spawn_idle_sweeper(
    host: Arc<dyn ActorHost>,
    ttl: Duration,
    every: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        loop {
            tokio::select! {
                () = cancel.cancelled() => {
                    info!("idle sweeper shutting down");
                    break;
                }
                _ = interval.tick() => {
                    let evicted = host.evict_idle(ttl);
                    if evicted > 0 {
                        info!(evicted, remaining = host.active_sessions(), "evicted idle sessions");
                    }
                }
            }
        }
    })
}

fn is_event_stream(response: &Response) -> bool {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("text/event-stream"))
}

fn actor_stopped() -> Response {
    (StatusCode::SERVICE_UNAVAILABLE, "session closed").into_response()
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
