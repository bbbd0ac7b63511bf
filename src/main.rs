#![forbid(unsafe_code)]

//! `toolhost`: serves the built-in sample tools over HTTP and MCP/SSE.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use toolhost::config::GlobalConfig;
use toolhost::mcp::{self, spawn_idle_sweeper, AppState};
use toolhost::tools::builtin;
use toolhost::{AppError, Result};

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "toolhost", about = "Tool server over HTTP and MCP/SSE", version, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file; defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the configured HTTP port.
    #[arg(long)]
    port: Option<u16>,

    /// Log output format (text or json).
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    /// Serve only `/tool-definition` and `/execute`.
    #[arg(long)]
    no_streaming: bool,
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.log_format)?;
    info!("toolhost bootstrap");

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| AppError::Config(format!("failed to build tokio runtime: {err}")))?
        .block_on(run(args))
}

async fn run(args: Cli) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => GlobalConfig::load_from_path(path)?,
        None => GlobalConfig::default(),
    };
    if let Some(port) = args.port {
        config.http_port = port;
    }
    if args.no_streaming {
        config.streaming.enabled = false;
    }
    info!(bind = %config.bind_addr(), streaming = config.streaming.enabled, "configuration loaded");

    let registry = builtin::registry();
    info!(tools = registry.len(), "tool registry built");

    let idle_ttl = config.streaming.idle_ttl();
    let sweep_every = config.streaming.sweep_interval();
    let state = AppState::new(config, registry);

    let ct = CancellationToken::new();
    let sweeper = match (&state.sessions, idle_ttl) {
        (Some(sessions), Some(ttl)) => Some(spawn_idle_sweeper(
            Arc::clone(sessions),
            ttl,
            sweep_every,
            ct.clone(),
        )),
        _ => None,
    };

    let mut http_handle = tokio::spawn(mcp::serve(state, ct.clone()));
    info!("toolhost ready");

    let finished = tokio::select! {
        () = shutdown_signal() => {
            info!("shutdown signal received");
            None
        }
        joined = &mut http_handle => Some(joined),
    };
    ct.cancel();

    let joined = match finished {
        Some(joined) => joined,
        None => http_handle.await,
    };
    if let Some(sweeper) = sweeper {
        let _ = sweeper.await;
    }

    let served = joined.map_err(|err| AppError::Io(format!("http task failed: {err}")))?;
    if let Err(err) = &served {
        error!(%err, "http server failed");
    }
    served?;
    info!("toolhost shut down");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(err) => {
                tracing::warn!(%err, "failed to register SIGTERM handler, using ctrl-c only");
                let _ = ctrl_c.await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(err) = ctrl_c.await {
            tracing::error!(%err, "ctrl-c signal handler failed");
        }
    }
}

fn init_tracing(log_format: LogFormat) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt().with_env_filter(env_filter);

    match log_format {
        LogFormat::Text => subscriber
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
        LogFormat::Json => subscriber
            .json()
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
    }

    Ok(())
}
