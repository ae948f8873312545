//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use futures::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tower::ServiceExt;

use quasar_api::{AppState, build_app};
use quasar_core::config::AppConfig;
use quasar_realtime::auth::SignatureVerifier;

pub const APP_KEY: &str = "test-key";
pub const APP_SECRET: &str = "test-secret";

const TEST_CONFIG: &str = r#"
[server]
host = "127.0.0.1"
port = 0
shutdown_grace_seconds = 1

[realtime]
socket_buffer_size = 64

[[apps]]
key = "test-key"
secret = "test-secret"

[[apps]]
key = "other-key"
secret = "other-secret"
"#;

/// Test application context
pub struct TestApp {
    /// Shared state; every router built from it talks to the same engine
    pub state: AppState,
    /// The Axum router for making test requests
    pub router: Router,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Raw body
    pub text: String,
    /// Parsed JSON body, `Null` when not JSON
    pub body: Value,
}

impl TestApp {
    /// Create a new test application
    pub fn new() -> Self {
        let config = AppConfig::from_toml(TEST_CONFIG).expect("Failed to parse test config");
        let state = AppState::from_config(config);
        let router = build_app(state.clone());
        Self { state, router }
    }

    /// Send a request through the router without a network listener
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: &str,
        authorization: Option<String>,
    ) -> TestResponse {
        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        if let Some(auth) = authorization {
            req = req.header("Authorization", auth);
        }

        let req = req
            .body(Body::from(body.to_string()))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");
        let text = String::from_utf8_lossy(&bytes).into_owned();
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);

        TestResponse { status, text, body }
    }

    /// Send a request signed with the test app's secret
    pub async fn signed(&self, method: &str, path: &str, body: &str) -> TestResponse {
        let message = SignatureVerifier::request_message(method, path, body);
        let token = SignatureVerifier::sign(APP_SECRET, &message);
        self.request(method, path, body, Some(format!("Bearer {token}")))
            .await
    }

    /// Trigger an event through the HTTP API
    pub async fn trigger(&self, channels: &[&str], event: &str, data: Value) -> TestResponse {
        let body = json!({ "channels": channels, "event": event, "data": data }).to_string();
        self.signed("POST", &format!("/apps/{APP_KEY}/events"), &body)
            .await
    }

    /// Serve the app on an ephemeral port; dropping the sender stops it
    pub async fn spawn(&self) -> (String, oneshot::Sender<()>) {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("No local addr");
        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let state = self.state.clone();
        tokio::spawn(async move {
            let _ = quasar_api::serve(listener, state, async move {
                let _ = stop_rx.await;
            })
            .await;
        });
        (format!("ws://{addr}"), stop_tx)
    }
}

/// A connected test client
pub struct TestSocket {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    /// Socket ID from the greeting
    pub socket_id: String,
}

impl TestSocket {
    /// Connect to an app and consume the greeting
    pub async fn connect(base: &str, app_key: &str) -> Self {
        let (stream, _) = connect_async(format!("{base}/app/{app_key}"))
            .await
            .expect("Failed to connect");
        let mut socket = Self {
            stream,
            socket_id: String::new(),
        };
        let greeting = socket.next_event().await;
        assert_eq!(greeting["event"], "quasar:connection_established");
        socket.socket_id = greeting["data"]["socket_id"]
            .as_str()
            .expect("No socket_id")
            .to_string();
        socket
    }

    /// Send a JSON frame
    pub async fn send(&mut self, frame: Value) {
        self.stream
            .send(Message::Text(frame.to_string().into()))
            .await
            .expect("Failed to send");
    }

    /// Subscribe to a presence channel with a valid signature
    pub async fn join_presence(&mut self, channel: &str, user_id: &str) {
        let data = json!({ "user_id": user_id }).to_string();
        let auth = SignatureVerifier::sign(
            APP_SECRET,
            &format!("{}:{channel}:{data}", self.socket_id),
        );
        self.send(json!({
            "event": "subscribe",
            "data": { "channel": channel, "auth": auth, "channel_data": data }
        }))
        .await;
    }

    /// Next protocol or channel event, skipping server pings
    pub async fn next_event(&mut self) -> Value {
        loop {
            let msg = tokio::time::timeout(Duration::from_secs(5), self.stream.next())
                .await
                .expect("Timed out waiting for event")
                .expect("Stream ended")
                .expect("WebSocket error");
            if let Message::Text(text) = msg {
                let value: Value = serde_json::from_str(text.as_str()).expect("Invalid JSON");
                if value["event"] != "quasar:ping" {
                    return value;
                }
            }
        }
    }

    /// Assert nothing arrives within a short window
    pub async fn expect_silence(&mut self) {
        let result = tokio::time::timeout(Duration::from_millis(200), self.stream.next()).await;
        assert!(result.is_err(), "Unexpected frame: {result:?}");
    }

    /// Close the connection
    pub async fn close(mut self) {
        let _ = self.stream.close(None).await;
    }
}
