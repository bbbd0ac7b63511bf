//! HTTP listener lifecycle.

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::dispatcher::{build_router, AppState};
use crate::{AppError, Result};

/// Bind `config.bind_addr()` and serve until `ct` is cancelled.
///
/// # Errors
///
/// Returns `AppError::Io` if the listener cannot bind or the server fails.
pub async fn serve(state: AppState, ct: CancellationToken) -> Result<()> {
    let bind = state.config.bind_addr();
    let listener = TcpListener::bind(bind)
        .await
        .map_err(|err| AppError::Io(format!("failed to bind {bind}: {err}")))?;
    serve_on(listener, state, ct).await
}

/// Serve on an already-bound listener until `ct` is cancelled.
///
/// Open session streams are closed when shutdown begins so graceful
/// shutdown is not held up by long-lived responses.
///
/// # Errors
///
/// Returns `AppError::Io` if the server fails.
pub async fn serve_on(listener: TcpListener, state: AppState, ct: CancellationToken) -> Result<()> {
    let local = listener
        .local_addr()
        .map_err(|err| AppError::Io(format!("failed to read listener address: {err}")))?;
    let sessions = state.sessions.clone();
    let router = build_router(state);

    info!(%local, streaming = sessions.is_some(), "starting HTTP listener");

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            ct.cancelled().await;
            if let Some(sessions) = sessions {
                sessions.shutdown();
            }
        })
        .await
        .map_err(|err| AppError::Io(format!("HTTP server error: {err}")))?;

    info!("HTTP listener shut down");
    Ok(())
}
