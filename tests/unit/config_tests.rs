use std::io::Write;
use std::net::IpAddr;
use std::time::Duration;

use toolhost::config::{GlobalConfig, DEFAULT_MAX_MESSAGE_BYTES, MAX_INTERVAL_SECONDS};
use toolhost::AppError;

fn sample_toml() -> &'static str {
    r#"
server_name = "tools-east"
http_host = "0.0.0.0"
http_port = 8080

[streaming]
enabled = true
sse_path = "/events"
message_path = "/events/post"
max_message_bytes = 1024
channel_capacity = 8
keep_alive_seconds = 15
session_idle_ttl_seconds = 600
sweep_interval_seconds = 30
"#
}

#[test]
fn parses_valid_config() {
    let config = GlobalConfig::from_toml_str(sample_toml()).expect("config parses");

    assert_eq!(config.server_name, "tools-east");
    assert_eq!(config.http_host, "0.0.0.0".parse::<IpAddr>().expect("ip"));
    assert_eq!(config.http_port, 8080);
    assert_eq!(config.streaming.sse_path, "/events");
    assert_eq!(config.streaming.message_path, "/events/post");
    assert_eq!(config.streaming.max_message_bytes, 1024);
    assert_eq!(config.streaming.keep_alive(), Some(Duration::from_secs(15)));
    assert_eq!(config.streaming.idle_ttl(), Some(Duration::from_secs(600)));
    assert_eq!(config.streaming.sweep_interval(), Duration::from_secs(30));
}

#[test]
fn empty_document_uses_defaults() {
    let config = GlobalConfig::from_toml_str("").expect("config parses");

    assert_eq!(config, GlobalConfig::default());
    assert_eq!(config.server_name, "toolhost");
    assert_eq!(config.bind_addr().to_string(), "127.0.0.1:3000");
    assert!(config.streaming.enabled);
    assert_eq!(config.streaming.sse_path, "/sse");
    assert_eq!(config.streaming.message_path, "/sse/message");
    assert_eq!(config.streaming.max_message_bytes, DEFAULT_MAX_MESSAGE_BYTES);
    assert_eq!(config.streaming.keep_alive(), None);
    assert_eq!(config.streaming.idle_ttl(), Some(Duration::from_secs(1800)));
}

#[test]
fn partial_streaming_table_keeps_other_defaults() {
    let config = GlobalConfig::from_toml_str("[streaming]\nenabled = false\n")
        .expect("config parses");

    assert!(!config.streaming.enabled);
    assert_eq!(config.streaming.sse_path, "/sse");
    assert_eq!(config.streaming.channel_capacity, 64);
}

#[test]
fn zero_ttl_disables_eviction() {
    let config = GlobalConfig::from_toml_str(
        "[streaming]\nsession_idle_ttl_seconds = 0\nsweep_interval_seconds = 0\n",
    )
    .expect("config parses");

    assert_eq!(config.streaming.idle_ttl(), None);
}

#[test]
fn loads_from_file() {
    let mut file = tempfile::NamedTempFile::new().expect("tempfile");
    file.write_all(sample_toml().as_bytes()).expect("write config");

    let config = GlobalConfig::load_from_path(file.path()).expect("config loads");
    assert_eq!(config.http_port, 8080);
}

#[test]
fn missing_file_is_config_error() {
    let temp = tempfile::tempdir().expect("tempdir");
    let result = GlobalConfig::load_from_path(temp.path().join("absent.toml"));

    assert!(matches!(result, Err(AppError::Config(_))));
}

#[test]
fn rejects_invalid_toml() {
    let result = GlobalConfig::from_toml_str("http_port = \"not a number\"");
    assert!(matches!(result, Err(AppError::Config(_))));
}

#[test]
fn rejects_relative_stream_path() {
    let result = GlobalConfig::from_toml_str("[streaming]\nsse_path = \"sse\"\n");
    assert!(matches!(result, Err(AppError::Config(msg)) if msg.contains("sse_path")));
}

#[test]
fn rejects_path_with_whitespace() {
    let result = GlobalConfig::from_toml_str("[streaming]\nmessage_path = \"/sse/my message\"\n");
    assert!(matches!(result, Err(AppError::Config(_))));
}

#[test]
fn rejects_identical_stream_paths() {
    let result = GlobalConfig::from_toml_str(
        "[streaming]\nsse_path = \"/mcp\"\nmessage_path = \"/mcp\"\n",
    );
    assert!(matches!(result, Err(AppError::Config(msg)) if msg.contains("must differ")));
}

#[test]
fn rejects_reserved_route_collision() {
    let result = GlobalConfig::from_toml_str("[streaming]\nsse_path = \"/execute\"\n");
    assert!(matches!(result, Err(AppError::Config(msg)) if msg.contains("reserved")));
}

#[test]
fn rejects_zero_message_cap() {
    let result = GlobalConfig::from_toml_str("[streaming]\nmax_message_bytes = 0\n");
    assert!(matches!(result, Err(AppError::Config(_))));
}

#[test]
fn rejects_zero_sweep_interval_with_ttl() {
    let result = GlobalConfig::from_toml_str("[streaming]\nsweep_interval_seconds = 0\n");
    assert!(matches!(result, Err(AppError::Config(_))));
}

#[test]
fn rejects_blank_server_name() {
    let result = GlobalConfig::from_toml_str("server_name = \"  \"\n");
    assert!(matches!(result, Err(AppError::Config(_))));
}

#[test]
fn rejects_out_of_range_keep_alive() {
    let result = GlobalConfig::from_toml_str(
        "[streaming]\nkeep_alive_seconds = 9223372036854775807\n",
    );
    assert!(
        matches!(result, Err(AppError::Config(msg)) if msg.contains("streaming.keep_alive_seconds"))
    );
}

#[test]
fn rejects_out_of_range_sweep_interval() {
    let toml = format!(
        "[streaming]\nsweep_interval_seconds = {}\n",
        MAX_INTERVAL_SECONDS + 1
    );
    let result = GlobalConfig::from_toml_str(&toml);
    assert!(matches!(result, Err(AppError::Config(_))));
}

#[test]
fn accepts_keep_alive_at_the_bound() {
    let toml = format!("[streaming]\nkeep_alive_seconds = {MAX_INTERVAL_SECONDS}\n");
    let config = GlobalConfig::from_toml_str(&toml).expect("config parses");
    assert_eq!(
        config.streaming.keep_alive(),
        Some(Duration::from_secs(MAX_INTERVAL_SECONDS))
    );
}
