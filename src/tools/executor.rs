//! Validate → adapt → invoke → format pipeline shared by the synchronous
//! execute endpoint and session `tools/call` requests.

use std::panic::AssertUnwindSafe;
use std::time::Instant;

use futures_util::FutureExt;
use serde_json::Value;
use tracing::{info, info_span, warn, Instrument};

use super::args::adapt;
use super::format::format;
use super::registry::ToolRegistry;
use crate::models::content::ContentEnvelope;
use crate::models::tool::ToolArgs;
use crate::{AppError, Result};

/// Run the tool named in an execute payload.
///
/// # Errors
///
/// See [`execute`]; additionally `AppError::Validation` when no name is given.
pub async fn execute_request(registry: &ToolRegistry, request: ToolArgs) -> Result<ContentEnvelope> {
    let name = request.tool_name()?.to_owned();
    execute(registry, &name, request.into_input()).await
}

/// Run tool `name` against raw `input`.
///
/// # Errors
///
/// - `AppError::NotFound` when no such tool is registered.
/// - `AppError::Validation` when `input` fails the tool's schema.
/// - `AppError::Handler` when the tool fails or panics.
pub async fn execute(registry: &ToolRegistry, name: &str, input: Value) -> Result<ContentEnvelope> {
    let tool = registry
        .get(name)
        .ok_or_else(|| AppError::NotFound(format!("Tool '{name}' not found")))?;

    let validated = match tool.schema() {
        Some(schema) => schema.validate(&input).map_err(|err| {
            AppError::Validation(format!("Invalid arguments for tool '{name}': {}", err.message()))
        })?,
        None => input,
    };

    let args = adapt(tool.schema(), validated);
    let handler = std::sync::Arc::clone(tool.handler());
    let span = info_span!("call_tool", tool = %name, argc = args.len());

    async move {
        let started = Instant::now();
        let outcome = AssertUnwindSafe(async move { handler.call(args).await })
            .catch_unwind()
            .await;

        match outcome {
            Ok(Ok(value)) => {
                info!(elapsed_ms = elapsed_ms(started), "tool completed");
                Ok(format(value))
            }
            Ok(Err(err)) => {
                warn!(%err, elapsed_ms = elapsed_ms(started), "tool failed");
                Err(AppError::Handler(err.to_string()))
            }
            Err(_) => {
                warn!("tool panicked");
                Err(AppError::Handler(format!("tool '{name}' panicked")))
            }
        }
    }
    .instrument(span)
    .await
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
