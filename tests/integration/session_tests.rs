//! MCP sessions over SSE: handshake, request/response round trips, message
//! rejection and isolation between sessions.

use reqwest::StatusCode;
use serde_json::{json, Value};

use super::test_helpers::{open_session, spawn_server, test_config, TestServer};

async fn post_message(server: &TestServer, endpoint: &str, body: &Value) -> reqwest::Response {
    reqwest::Client::new()
        .post(server.url(endpoint))
        .json(body)
        .send()
        .await
        .expect("POST message")
}

#[tokio::test]
async fn stream_opens_with_endpoint_event() {
    let server = spawn_server(test_config()).await;

    let resp = reqwest::get(server.url("/sse")).await.expect("GET /sse");
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()["content-type"], "text/event-stream");
    assert_eq!(resp.headers()["access-control-allow-origin"], "*");

    let mut events = super::test_helpers::EventStream::new(resp);
    let (event, endpoint) = events.next_event().await;
    assert_eq!(event, "endpoint");
    assert!(endpoint.starts_with("/sse/message?sessionId="), "{endpoint}");
}

#[tokio::test]
async fn initialize_round_trip() {
    let server = spawn_server(test_config()).await;
    let (mut events, endpoint) = open_session(&server).await;

    let resp = post_message(
        &server,
        &endpoint,
        &json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {}}),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::ACCEPTED);
    assert_eq!(resp.text().await.expect("body"), "Accepted");

    let reply = events.next_message().await;
    assert_eq!(reply["id"], 1);
    assert_eq!(reply["result"]["protocolVersion"], "2024-11-05");
    assert_eq!(reply["result"]["serverInfo"]["name"], "toolhost");
}

#[tokio::test]
async fn tools_list_and_call_over_session() {
    let server = spawn_server(test_config()).await;
    let (mut events, endpoint) = open_session(&server).await;

    post_message(
        &server,
        &endpoint,
        &json!({"jsonrpc": "2.0", "id": "list", "method": "tools/list"}),
    )
    .await;
    let listed = events.next_message().await;
    assert_eq!(listed["id"], "list");
    assert_eq!(listed["result"]["tools"][0]["name"], "add");

    post_message(
        &server,
        &endpoint,
        &json!({
            "jsonrpc": "2.0",
            "id": 2,
            "method": "tools/call",
            "params": {"name": "greet", "arguments": {"name": "Ada"}}
        }),
    )
    .await;
    let called = events.next_message().await;
    assert_eq!(
        called["result"],
        json!({"content": [{"type": "text", "text": "Hello, Ada!"}]})
    );
}

#[tokio::test]
async fn tool_errors_come_back_as_jsonrpc_errors() {
    let server = spawn_server(test_config()).await;
    let (mut events, endpoint) = open_session(&server).await;

    post_message(
        &server,
        &endpoint,
        &json!({
            "jsonrpc": "2.0",
            "id": 3,
            "method": "tools/call",
            "params": {"name": "doesNotExist"}
        }),
    )
    .await;
    let reply = events.next_message().await;
    assert_eq!(reply["error"]["code"], -32602);
    assert_eq!(reply["error"]["message"], "Tool 'doesNotExist' not found");
}

#[tokio::test]
async fn malformed_message_is_rejected_and_session_survives() {
    let server = spawn_server(test_config()).await;
    let (mut events, endpoint) = open_session(&server).await;

    let resp = post_message(&server, &endpoint, &json!({"not": "valid"})).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = post_message(
        &server,
        &endpoint,
        &json!({"jsonrpc": "2.0", "id": 9, "method": "ping"}),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::ACCEPTED);
    let reply = events.next_message().await;
    assert_eq!(reply, json!({"jsonrpc": "2.0", "id": 9, "result": {}}));
}

#[tokio::test]
async fn oversized_message_is_rejected() {
    let mut config = test_config();
    config.streaming.max_message_bytes = 64;
    let server = spawn_server(config).await;
    let (_events, endpoint) = open_session(&server).await;

    let padding = "x".repeat(128);
    let resp = post_message(
        &server,
        &endpoint,
        &json!({"jsonrpc": "2.0", "method": "notifications/note", "params": {"pad": padding}}),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn message_to_unopened_session_is_server_error() {
    let server = spawn_server(test_config()).await;

    let resp = post_message(
        &server,
        "/sse/message?sessionId=never-opened",
        &json!({"jsonrpc": "2.0", "id": 1, "method": "ping"}),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn sessions_are_isolated() {
    let server = spawn_server(test_config()).await;
    let (mut first, first_endpoint) = open_session(&server).await;
    let (mut second, second_endpoint) = open_session(&server).await;
    assert_ne!(first_endpoint, second_endpoint);

    post_message(
        &server,
        &second_endpoint,
        &json!({"jsonrpc": "2.0", "id": "b", "method": "ping"}),
    )
    .await;
    post_message(
        &server,
        &first_endpoint,
        &json!({"jsonrpc": "2.0", "id": "a", "method": "ping"}),
    )
    .await;

    assert_eq!(first.next_message().await["id"], "a");
    assert_eq!(second.next_message().await["id"], "b");
}

#[tokio::test]
async fn unknown_method_gets_method_not_found() {
    let server = spawn_server(test_config()).await;
    let (mut events, endpoint) = open_session(&server).await;

    post_message(
        &server,
        &endpoint,
        &json!({"jsonrpc": "2.0", "id": 4, "method": "resources/list"}),
    )
    .await;
    let reply = events.next_message().await;
    assert_eq!(reply["error"]["code"], -32601);
    assert_eq!(reply["error"]["message"], "Method not found: resources/list");
}

#[tokio::test]
async fn dropping_one_stream_leaves_the_other_session_working() {
    let server = spawn_server(test_config()).await;
    let (first, _first_endpoint) = open_session(&server).await;
    let (mut second, second_endpoint) = open_session(&server).await;

    drop(first);

    let resp = post_message(
        &server,
        &second_endpoint,
        &json!({"jsonrpc": "2.0", "id": "still-here", "method": "ping"}),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::ACCEPTED);
    assert_eq!(second.next_message().await["id"], "still-here");
}
