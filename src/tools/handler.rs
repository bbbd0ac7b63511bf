//! Uniform calling convention for tool implementations.

use std::future::Future;

use futures_util::future::BoxFuture;
use serde_json::Value;

use super::args::InvocationArgs;

/// Error a tool implementation may fail with. Its `Display` text is
/// forwarded to the client verbatim.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Outcome of a tool invocation. `Value::Null` means "no result".
pub type HandlerResult = Result<Value, BoxError>;

/// Future returned by [`ToolHandler::call`].
pub type HandlerFuture = BoxFuture<'static, HandlerResult>;

/// A callable tool implementation.
///
/// Implemented for every `Fn(InvocationArgs) -> impl Future<Output = HandlerResult>`,
/// so async closures register directly.
pub trait ToolHandler: Send + Sync {
    /// Invoke the tool.
    fn call(&self, args: InvocationArgs) -> HandlerFuture;
}

impl<F, Fut> ToolHandler for F
where
    F: Fn(InvocationArgs) -> Fut + Send + Sync,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    fn call(&self, args: InvocationArgs) -> HandlerFuture {
        Box::pin(self(args))
    }
}

/// Wrap a synchronous function as a [`ToolHandler`].
pub fn sync_handler<F>(f: F) -> impl ToolHandler
where
    F: Fn(InvocationArgs) -> HandlerResult + Send + Sync,
{
    move |args: InvocationArgs| std::future::ready(f(args))
}
