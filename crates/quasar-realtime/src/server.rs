//! Top-level real-time engine that ties together all subsystems.

use std::sync::Arc;

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::info;

use quasar_core::config::AppConfig;

use crate::application::AppRegistry;
use crate::connection::manager::ConnectionManager;
use crate::metrics::{MetricsSnapshot, RealtimeMetrics};
use crate::trigger::gateway::TriggerGateway;

/// Per-application connection count for health reporting.
#[derive(Debug, Clone, Serialize)]
pub struct AppStatus {
    /// App key.
    pub key: String,
    /// Sockets connected to the app's namespace.
    pub connections: usize,
}

/// Central real-time engine that coordinates the broker subsystems.
#[derive(Clone)]
pub struct RealtimeEngine {
    /// Registered applications and their namespaces.
    pub registry: Arc<AppRegistry>,
    /// Socket lifecycle and inbound routing.
    pub connections: Arc<ConnectionManager>,
    /// Signed HTTP publish pipeline.
    pub trigger: Arc<TriggerGateway>,
    /// Metrics collector.
    pub metrics: Arc<RealtimeMetrics>,
    shutdown: CancellationToken,
}

impl std::fmt::Debug for RealtimeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeEngine")
            .field("apps", &self.registry.keys())
            .finish()
    }
}

impl RealtimeEngine {
    /// Creates the engine with one namespace per configured application.
    pub fn new(config: &AppConfig) -> Self {
        let metrics = Arc::new(RealtimeMetrics::new());
        let registry = Arc::new(AppRegistry::from_config(&config.apps, metrics.clone()));
        let connections = Arc::new(ConnectionManager::new(
            config.realtime.clone(),
            registry.clone(),
            metrics.clone(),
        ));
        let trigger = Arc::new(TriggerGateway::new(registry.clone(), metrics.clone()));

        info!(apps = registry.len(), "Real-time engine initialized");

        Self {
            registry,
            connections,
            trigger,
            metrics,
            shutdown: CancellationToken::new(),
        }
    }

    /// Token cancelled when the engine shuts down.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Current metrics.
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Connection counts per application, sorted by key.
    pub fn app_statuses(&self) -> Vec<AppStatus> {
        self.registry
            .keys()
            .into_iter()
            .map(|key| AppStatus {
                connections: self.connections.app_connection_count(&key),
                key,
            })
            .collect()
    }

    /// Stops accepting work and closes every connection.
    pub fn shutdown(&self) {
        info!("Shutting down real-time engine");
        self.shutdown.cancel();
        self.connections.close_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> RealtimeEngine {
        let config = AppConfig::from_toml(
            r#"
            [[apps]]
            key = "a"
            secret = "sa"

            [[apps]]
            key = "b"
            secret = "sb"
            "#,
        )
        .unwrap();
        RealtimeEngine::new(&config)
    }

    #[tokio::test]
    async fn test_app_statuses_and_shutdown() {
        let engine = engine();
        let conn = engine.connections.accept("b").await.unwrap();

        let statuses = engine.app_statuses();
        assert_eq!(statuses.len(), 2);
        assert_eq!(statuses[0].connections, 0);
        assert_eq!(statuses[1].connections, 1);

        engine.shutdown();
        assert!(engine.shutdown_token().is_cancelled());
        assert!(!conn.handle.is_alive());
        assert_eq!(engine.metrics_snapshot().connections_total, 1);
    }
}
