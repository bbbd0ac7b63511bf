//! Model Context Protocol serving layer: HTTP dispatch, session actors and
//! the SSE transport.

pub mod actor;
pub mod dispatcher;
pub mod http;
pub mod server;
pub mod session;
pub mod transport;

pub use actor::{spawn_idle_sweeper, ActorHandle, ActorHost, LocalActorHost, SessionKey};
pub use dispatcher::{build_router, AppState};
pub use http::{serve, serve_on};
pub use server::McpServer;
pub use session::{SessionRouter, SessionSettings, SessionState};
pub use transport::{SseTransport, TransportHandler, TransportOptions, TransportState};
