//! `GET /tool-definition` and CORS handling.

use reqwest::Method;
use serde_json::{json, Value};

use super::test_helpers::{spawn_server, test_config};

#[tokio::test]
async fn tool_definitions_describe_builtin_tools() {
    let server = spawn_server(test_config()).await;

    let resp = reqwest::get(server.url("/tool-definition"))
        .await
        .expect("GET /tool-definition");
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.expect("json body");
    assert_eq!(
        body["greet"],
        json!({
            "name": "greet",
            "description": "Tool: greet",
            "inputSchema": {
                "type": "object",
                "properties": {"name": {"type": "string", "description": "Who to greet"}},
                "required": ["name"]
            }
        })
    );
    assert_eq!(body["add"]["description"], "Add two numbers");
    assert_eq!(body["add"]["inputSchema"]["required"], json!(["a", "b"]));
    assert_eq!(
        body["echo"]["inputSchema"],
        json!({"type": "object", "properties": {}})
    );
}

#[tokio::test]
async fn responses_carry_cors_headers() {
    let server = spawn_server(test_config()).await;

    let resp = reqwest::get(server.url("/tool-definition"))
        .await
        .expect("GET /tool-definition");

    let headers = resp.headers();
    assert_eq!(headers["access-control-allow-origin"], "*");
    assert_eq!(headers["access-control-allow-methods"], "GET, POST, OPTIONS");
    assert_eq!(headers["access-control-allow-headers"], "Content-Type");
}

#[tokio::test]
async fn preflight_is_answered_for_any_path() {
    let server = spawn_server(test_config()).await;
    let client = reqwest::Client::new();

    for path in ["/execute", "/tool-definition", "/sse", "/anything/else"] {
        let resp = client
            .request(Method::OPTIONS, server.url(path))
            .send()
            .await
            .expect("OPTIONS");
        assert_eq!(resp.status(), 204, "preflight for {path}");
        assert_eq!(resp.headers()["access-control-allow-origin"], "*");
    }
}

#[tokio::test]
async fn unknown_path_is_not_found() {
    let server = spawn_server(test_config()).await;

    let resp = reqwest::get(server.url("/nope")).await.expect("GET /nope");
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn session_root_reports_readiness() {
    let server = spawn_server(test_config()).await;

    let resp = reqwest::get(server.url("/")).await.expect("GET /");
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.expect("json body");
    assert_eq!(body, json!({"status": "ready", "server": "toolhost"}));
}

#[tokio::test]
async fn wrong_method_on_api_paths_is_not_found() {
    for streaming in [true, false] {
        let mut config = test_config();
        config.streaming.enabled = streaming;
        let server = spawn_server(config).await;
        let client = reqwest::Client::new();

        for (method, path) in [(Method::POST, "/tool-definition"), (Method::GET, "/execute")] {
            let resp = client
                .request(method.clone(), server.url(path))
                .send()
                .await
                .expect("request");
            assert_eq!(resp.status(), 404, "{method} {path}, streaming={streaming}");
            assert_eq!(resp.headers()["access-control-allow-origin"], "*");
        }
    }
}
