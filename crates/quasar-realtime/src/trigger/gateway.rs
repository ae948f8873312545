//! Trigger gateway: authenticates signed HTTP requests and fans events out.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use quasar_core::types::SocketId;

use crate::application::AppRegistry;
use crate::auth::SignatureVerifier;
use crate::channel::ChannelName;
use crate::error::BrokerError;
use crate::metrics::RealtimeMetrics;
use crate::namespace::Namespace;

use super::request::{TriggerEvent, TriggerRequest};

/// Result of an accepted trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TriggerOutcome {
    /// Channels the event was published to.
    pub channels: usize,
    /// Sockets the event was queued for.
    pub delivered: usize,
}

/// HTTP-facing publish entry point.
#[derive(Debug, Clone)]
pub struct TriggerGateway {
    registry: Arc<AppRegistry>,
    metrics: Arc<RealtimeMetrics>,
}

impl TriggerGateway {
    /// Creates a gateway over the registered applications.
    pub fn new(registry: Arc<AppRegistry>, metrics: Arc<RealtimeMetrics>) -> Self {
        Self { registry, metrics }
    }

    /// Authenticates and publishes one trigger request.
    pub async fn trigger(&self, request: TriggerRequest<'_>) -> Result<TriggerOutcome, BrokerError> {
        let result = self.publish(request).await;
        self.metrics.trigger(result.is_ok());
        if let Err(err) = &result {
            warn!(app_key = %request.app_key, error = %err, "Trigger rejected");
        }
        result
    }

    /// Resolves the namespace for a signed request.
    ///
    /// Checks, in order: the app key exists (404), a bearer token is present
    /// (400), and the token signs `"{METHOD}\n{path}:{body}"` (403).
    pub fn authenticate(
        &self,
        app_key: &str,
        method: &str,
        path: &str,
        body: &str,
        authorization: Option<&str>,
    ) -> Result<Arc<Namespace>, BrokerError> {
        let namespace = self.registry.require(app_key)?;

        let token = authorization.and_then(bearer_token).ok_or_else(|| {
            BrokerError::AuthMissing("Authorization: Bearer <signature> is required".to_string())
        })?;

        let message = SignatureVerifier::request_message(method, path, body);
        if !SignatureVerifier::verify(&namespace.app().secret, &message, token) {
            return Err(BrokerError::AuthInvalid(format!("{method} {path}")));
        }

        Ok(namespace)
    }

    async fn publish(&self, request: TriggerRequest<'_>) -> Result<TriggerOutcome, BrokerError> {
        let namespace = self.authenticate(
            request.app_key,
            request.method,
            request.path,
            request.body,
            request.authorization,
        )?;
        let event = TriggerEvent::parse(request.body, request.content_type)?;

        // Listing a channel twice must not deliver the event twice.
        let mut seen = HashSet::new();
        let channels: Vec<String> = event
            .channels
            .into_iter()
            .filter(|channel| match ChannelName::parse(channel) {
                Ok(_) => true,
                Err(err) => {
                    warn!(app_key = %request.app_key, error = %err, "Skipping invalid channel");
                    false
                }
            })
            .filter(|channel| seen.insert(channel.clone()))
            .collect();

        let mut exclude = None;
        if let Some(socket_id) = event.socket_id.as_deref().and_then(|s| s.parse::<SocketId>().ok()) {
            if namespace.is_connected(&socket_id).await {
                exclude = Some(socket_id);
            }
        }

        let delivered = namespace
            .broadcast(&channels, &event.event, &event.data, exclude.as_ref())
            .await;

        debug!(
            app_key = %request.app_key,
            event = %event.event,
            channels = channels.len(),
            delivered,
            "Trigger accepted"
        );

        Ok(TriggerOutcome {
            channels: channels.len(),
            delivered,
        })
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` value.
pub fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use quasar_core::config::ApplicationConfig;
    use serde_json::{Value, json};
    use tokio::sync::mpsc;

    const PATH: &str = "/apps/key/events";

    fn gateway() -> TriggerGateway {
        let metrics = Arc::new(RealtimeMetrics::new());
        let registry = AppRegistry::from_config(
            &[ApplicationConfig {
                key: "key".into(),
                secret: "secret".into(),
                options: HashMap::new(),
            }],
            metrics.clone(),
        );
        TriggerGateway::new(Arc::new(registry), metrics)
    }

    fn request<'a>(body: &'a str, authorization: Option<&'a str>) -> TriggerRequest<'a> {
        TriggerRequest {
            app_key: "key",
            method: "POST",
            path: PATH,
            body,
            authorization,
            content_type: Some("application/json"),
        }
    }

    fn bearer(body: &str) -> String {
        let sig = SignatureVerifier::sign("secret", &format!("POST\n{PATH}:{body}"));
        format!("Bearer {sig}")
    }

    async fn subscriber(
        gateway: &TriggerGateway,
        channel: &str,
    ) -> (SocketId, mpsc::Receiver<String>) {
        let ns = gateway.registry.require("key").unwrap();
        let (tx, mut rx) = mpsc::channel(16);
        let handle = ns.connect(tx).await;
        ns.subscribe(&handle.id, channel, None, None).await.unwrap();
        rx.recv().await.unwrap();
        (handle.id, rx)
    }

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(bearer_token("bearer  abc "), Some("abc"));
        assert_eq!(bearer_token("Basic abc"), None);
        assert_eq!(bearer_token("Bearer"), None);
        assert_eq!(bearer_token("Bearer "), None);
    }

    #[tokio::test]
    async fn test_status_codes() {
        let gw = gateway();
        let body = r#"{"channels":["news"],"event":"e"}"#;

        let mut unknown = request(body, None);
        unknown.app_key = "nope";
        assert_eq!(gw.trigger(unknown).await.unwrap_err().status_code(), 404);

        assert_eq!(gw.trigger(request(body, None)).await.unwrap_err().status_code(), 400);
        assert_eq!(
            gw.trigger(request(body, Some("Token abc"))).await.unwrap_err().status_code(),
            400
        );

        let bad = format!("Bearer {}", "0".repeat(64));
        assert_eq!(gw.trigger(request(body, Some(&bad))).await.unwrap_err().status_code(), 403);

        let good = bearer(body);
        assert_eq!(
            gw.trigger(request(body, Some(&good))).await.unwrap(),
            TriggerOutcome { channels: 1, delivered: 0 }
        );

        let snapshot = gw.metrics.snapshot();
        assert_eq!(snapshot.triggers_accepted, 1);
        assert_eq!(snapshot.triggers_rejected, 4);
    }

    #[tokio::test]
    async fn test_wrong_signature_delivers_nothing() {
        let gw = gateway();
        let (_id, mut rx) = subscriber(&gw, "news").await;
        let body = r#"{"channels":["news"],"event":"e"}"#;
        let sig = SignatureVerifier::sign("wrong", &format!("POST\n{PATH}:{body}"));
        let auth = format!("Bearer {sig}");

        assert!(matches!(
            gw.trigger(request(body, Some(&auth))).await,
            Err(BrokerError::AuthInvalid(_))
        ));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_socket_id_excludes_sender_only() {
        let gw = gateway();
        let (sender, mut sender_rx) = subscriber(&gw, "news").await;
        let (_other, mut other_rx) = subscriber(&gw, "news").await;

        let body = json!({
            "channels": ["news", "bad channel"],
            "event": "App\\Updated",
            "data": "{\"n\":1}",
            "socket_id": sender.to_string(),
        })
        .to_string();
        let auth = bearer(&body);

        let outcome = gw.trigger(request(&body, Some(&auth))).await.unwrap();
        assert_eq!(outcome, TriggerOutcome { channels: 1, delivered: 1 });

        assert!(sender_rx.try_recv().is_err());
        let frame: Value = serde_json::from_str(&other_rx.try_recv().unwrap()).unwrap();
        assert_eq!(
            frame,
            json!({"event": "news#App.Updated", "channel": "news", "data": {"n": 1}})
        );
    }

    #[tokio::test]
    async fn test_unknown_socket_id_is_not_excluded() {
        let gw = gateway();
        let (_a, mut rx) = subscriber(&gw, "news").await;
        let body = json!({
            "channels": ["news"],
            "event": "e",
            "socket_id": SocketId::new().to_string(),
        })
        .to_string();
        let auth = bearer(&body);

        gw.trigger(request(&body, Some(&auth))).await.unwrap();
        assert!(rx.try_recv().is_ok());
    }

    #[tokio::test]
    async fn test_repeated_channel_delivers_once() {
        let gw = gateway();
        let (_a, mut rx) = subscriber(&gw, "news").await;
        let body = r#"{"channels":["news","news","news"],"event":"e"}"#;
        let auth = bearer(body);

        let outcome = gw.trigger(request(body, Some(&auth))).await.unwrap();
        assert_eq!(outcome, TriggerOutcome { channels: 1, delivered: 1 });
        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_malformed_body_is_validation_error() {
        let gw = gateway();
        let body = r#"{"event":"e"}"#;
        let auth = bearer(body);
        assert_eq!(
            gw.trigger(request(body, Some(&auth))).await.unwrap_err().status_code(),
            400
        );
    }
}
