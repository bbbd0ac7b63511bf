//! Global configuration parsing and validation.

use std::fs;
use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::{AppError, Result};

/// Hard cap on an inbound session message body (4 MiB).
pub const DEFAULT_MAX_MESSAGE_BYTES: usize = 4 * 1024 * 1024;

/// Upper bound for keep-alive and sweep intervals (one day).
pub const MAX_INTERVAL_SECONDS: u64 = 86_400;

/// Path serving the tool definition map.
pub const TOOL_DEFINITION_PATH: &str = "/tool-definition";

/// Path accepting synchronous tool invocations.
pub const EXECUTE_PATH: &str = "/execute";

/// Session streaming settings.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", default)]
pub struct StreamingConfig {
    /// Whether requests outside the synchronous API reach session actors.
    pub enabled: bool,
    /// Path suffix that opens an event stream.
    pub sse_path: String,
    /// Path suffix that accepts POSTed client messages.
    pub message_path: String,
    /// Maximum accepted size of one POSTed message.
    pub max_message_bytes: usize,
    /// Outbound frame buffer per session.
    pub channel_capacity: usize,
    /// Keep-alive comment interval; 0 disables keep-alives.
    pub keep_alive_seconds: u64,
    /// Idle time after which a session is evicted; 0 disables eviction.
    pub session_idle_ttl_seconds: u64,
    /// How often the idle sweeper runs.
    pub sweep_interval_seconds: u64,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sse_path: "/sse".into(),
            message_path: "/sse/message".into(),
            max_message_bytes: DEFAULT_MAX_MESSAGE_BYTES,
            channel_capacity: 64,
            keep_alive_seconds: 0,
            session_idle_ttl_seconds: 1800,
            sweep_interval_seconds: 60,
        }
    }
}

impl StreamingConfig {
    /// Keep-alive interval, if enabled.
    #[must_use]
    pub fn keep_alive(&self) -> Option<Duration> {
        (self.keep_alive_seconds > 0).then(|| Duration::from_secs(self.keep_alive_seconds))
    }

    /// Idle session TTL, if enabled.
    #[must_use]
    pub fn idle_ttl(&self) -> Option<Duration> {
        (self.session_idle_ttl_seconds > 0)
            .then(|| Duration::from_secs(self.session_idle_ttl_seconds))
    }

    /// Interval between idle sweeps.
    #[must_use]
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_seconds)
    }
}

/// Global configuration parsed from `toolhost.toml`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", default)]
pub struct GlobalConfig {
    /// Name reported to clients in `initialize` and readiness payloads.
    pub server_name: String,
    /// Address the HTTP listener binds to.
    pub http_host: IpAddr,
    /// Port the HTTP listener binds to; 0 picks an ephemeral port.
    pub http_port: u16,
    /// Session streaming settings.
    pub streaming: StreamingConfig,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            server_name: "toolhost".into(),
            http_host: IpAddr::from([127, 0, 0, 1]),
            http_port: 3000,
            streaming: StreamingConfig::default(),
        }
    }
}

impl GlobalConfig {
    /// Load and validate configuration from a TOML file path.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the file cannot be read or contains
    /// invalid TOML, or if validation fails.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|err| AppError::Config(format!("failed to read config: {err}")))?;
        Self::from_toml_str(&raw)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if parsing or validation fails.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Socket address the HTTP listener binds to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.http_host, self.http_port)
    }

    /// Check cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` describing the first violated constraint.
    pub fn validate(&self) -> Result<()> {
        if self.server_name.trim().is_empty() {
            return Err(AppError::Config("server_name must not be empty".into()));
        }

        let streaming = &self.streaming;
        validate_path("streaming.sse_path", &streaming.sse_path)?;
        validate_path("streaming.message_path", &streaming.message_path)?;

        if streaming.sse_path == streaming.message_path {
            return Err(AppError::Config(
                "streaming.sse_path and streaming.message_path must differ".into(),
            ));
        }

        for path in [&streaming.sse_path, &streaming.message_path] {
            if path == TOOL_DEFINITION_PATH || path == EXECUTE_PATH {
                return Err(AppError::Config(format!(
                    "streaming path {path} collides with a reserved route"
                )));
            }
        }

        if streaming.max_message_bytes == 0 {
            return Err(AppError::Config(
                "streaming.max_message_bytes must be greater than zero".into(),
            ));
        }

        if streaming.channel_capacity == 0 {
            return Err(AppError::Config(
                "streaming.channel_capacity must be greater than zero".into(),
            ));
        }

        for (key, seconds) in [
            ("streaming.keep_alive_seconds", streaming.keep_alive_seconds),
            ("streaming.sweep_interval_seconds", streaming.sweep_interval_seconds),
        ] {
            if seconds > MAX_INTERVAL_SECONDS {
                return Err(AppError::Config(format!(
                    "{key} must be at most {MAX_INTERVAL_SECONDS}"
                )));
            }
        }

        if streaming.session_idle_ttl_seconds > 0 && streaming.sweep_interval_seconds == 0 {
            return Err(AppError::Config(
                "streaming.sweep_interval_seconds must be greater than zero when a session TTL is set"
                    .into(),
            ));
        }

        Ok(())
    }
}

fn validate_path(key: &str, path: &str) -> Result<()> {
    if !path.starts_with('/') {
        return Err(AppError::Config(format!("{key} must start with '/'")));
    }
    if path.len() < 2 {
        return Err(AppError::Config(format!("{key} must not be the root path")));
    }
    if path.chars().any(|c| c.is_whitespace() || c == '?' || c == '#') {
        return Err(AppError::Config(format!(
            "{key} must not contain whitespace, '?' or '#'"
        )));
    }
    Ok(())
}
