use axum::body::to_bytes;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::{json, Value};

use toolhost::models::jsonrpc::{error_codes, JsonRpcMessage, RequestId};
use toolhost::AppError;

async fn render(err: AppError) -> (StatusCode, Value) {
    let response = err.into_response();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    (status, serde_json::from_slice(&body).expect("json body"))
}

#[tokio::test]
async fn not_found_renders_error_body() {
    let (status, body) = render(AppError::NotFound("Tool 'doesNotExist' not found".into())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Tool 'doesNotExist' not found"}));
}

#[tokio::test]
async fn validation_renders_bad_request() {
    let (status, body) = render(AppError::Validation("Tool name is required".into())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Tool name is required"}));
}

#[tokio::test]
async fn handler_failure_renders_server_error() {
    let (status, body) = render(AppError::Handler("disk on fire".into())).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "disk on fire"}));
}

#[test]
fn io_error_converts() {
    let err: AppError = std::io::Error::other("socket gone").into();
    assert!(matches!(err, AppError::Io(msg) if msg.contains("socket gone")));
}

#[test]
fn jsonrpc_reply_uses_mapped_code() {
    let reply = JsonRpcMessage::from_error(
        RequestId::String("r1".into()),
        &AppError::Validation("Invalid arguments for tool 'greet': name: required".into()),
    );
    let error = reply.error.expect("error payload");
    assert_eq!(error.code, error_codes::INVALID_PARAMS);
    assert_eq!(error.message, "Invalid arguments for tool 'greet': name: required");
}

#[test]
fn protocol_errors_map_to_invalid_request() {
    assert_eq!(
        AppError::ProtocolParse(String::new()).jsonrpc_code(),
        error_codes::INVALID_REQUEST
    );
    assert_eq!(
        AppError::Handler(String::new()).jsonrpc_code(),
        error_codes::INTERNAL_ERROR
    );
}
