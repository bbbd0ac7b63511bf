//! Tool registration and invocation.

pub mod args;
pub mod builtin;
pub mod executor;
pub mod format;
pub mod handler;
pub mod registry;

pub use args::{adapt, InvocationArgs};
pub use executor::{execute, execute_request};
pub use format::format;
pub use handler::{sync_handler, BoxError, HandlerResult, ToolHandler};
pub use registry::{Tool, ToolRegistry, ToolRegistryBuilder};
