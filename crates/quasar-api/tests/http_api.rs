//! Integration tests for the signed HTTP endpoints.

mod helpers;

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;

use quasar_realtime::auth::SignatureVerifier;

use helpers::{APP_KEY, APP_SECRET, TestApp};

const EVENTS: &str = "/apps/test-key/events";

#[tokio::test]
async fn test_trigger_accepts_signed_request() {
    let app = TestApp::new();

    let response = app.trigger(&["news"], "update", json!({"v": 1})).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.text, "200 OK");
}

#[tokio::test]
async fn test_trigger_without_bearer_is_400() {
    let app = TestApp::new();
    let body = r#"{"channels":["news"],"event":"e"}"#;

    let response = app.request("POST", EVENTS, body, None).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "VALIDATION_ERROR");

    let response = app
        .request("POST", EVENTS, body, Some("Basic dXNlcjpwYXNz".into()))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_trigger_with_wrong_signature_is_403() {
    let app = TestApp::new();
    let body = r#"{"channels":["news"],"event":"e"}"#;
    let forged = format!("Bearer {}", "ab".repeat(32));

    let response = app.request("POST", EVENTS, body, Some(forged)).await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(app.state.realtime.metrics_snapshot().triggers_rejected, 1);
}

#[tokio::test]
async fn test_signature_covers_body() {
    let app = TestApp::new();
    let signed_body = r#"{"channels":["news"],"event":"e"}"#;
    let message = SignatureVerifier::request_message("POST", EVENTS, signed_body);
    let token = SignatureVerifier::sign(APP_SECRET, &message);

    let tampered = r#"{"channels":["news"],"event":"evil"}"#;
    let response = app
        .request("POST", EVENTS, tampered, Some(format!("Bearer {token}")))
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_trigger_unknown_app_is_404() {
    let app = TestApp::new();
    let response = app
        .request("POST", "/apps/missing/events", "{}", Some("Bearer x".into()))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_trigger_with_malformed_fields_is_400() {
    let app = TestApp::new();
    let response = app.signed("POST", EVENTS, r#"{"channels":"oops","event":"e"}"#).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_channel_queries() {
    let app = TestApp::new();
    let path = format!("/apps/{APP_KEY}/channels");

    let response = app.signed("GET", &path, "").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, json!({"channels": {}}));

    let response = app.signed("GET", &format!("{path}/presence-room"), "").await;
    assert_eq!(
        response.body,
        json!({"occupied": false, "subscription_count": 0, "user_count": 0})
    );

    let response = app.signed("GET", &format!("{path}/presence-room/users"), "").await;
    assert_eq!(response.body, json!({"users": []}));

    let response = app.signed("GET", &format!("{path}/news/users"), "").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app.request("GET", &path, "", None).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new();

    let response = app.request("GET", "/api/health", "", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
    assert_eq!(response.body["connections"], 0);
    assert_eq!(response.body["apps"].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn test_socket_route_rejects_unknown_app_before_upgrade() {
    let app = TestApp::new();

    let response = app.request("GET", "/app/missing", "", None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = app.request("GET", &format!("/app/{APP_KEY}"), "", None).await;
    assert_ne!(response.status, StatusCode::NOT_FOUND);
    assert!(response.status.is_client_error());
}
