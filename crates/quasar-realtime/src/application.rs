//! Registered applications and the per-application namespace registry.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use quasar_core::config::ApplicationConfig;

use crate::error::BrokerError;
use crate::metrics::RealtimeMetrics;
use crate::namespace::Namespace;

/// One tenant. Immutable after load.
#[derive(Clone)]
pub struct Application {
    /// Public key; routes sockets and triggers to this tenant.
    pub key: String,
    /// HMAC secret for channel auth and trigger signatures.
    pub secret: String,
    /// Free-form options carried from configuration.
    pub options: HashMap<String, serde_json::Value>,
}

impl std::fmt::Debug for Application {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Application")
            .field("key", &self.key)
            .field("secret", &"<redacted>")
            .field("options", &self.options)
            .finish()
    }
}

impl From<&ApplicationConfig> for Application {
    fn from(config: &ApplicationConfig) -> Self {
        Self {
            key: config.key.clone(),
            secret: config.secret.clone(),
            options: config.options.clone(),
        }
    }
}

/// App key → namespace. Built once at startup and never mutated.
#[derive(Debug, Default)]
pub struct AppRegistry {
    namespaces: BTreeMap<String, Arc<Namespace>>,
}

impl AppRegistry {
    /// Builds one namespace per configured application.
    pub fn from_config(apps: &[ApplicationConfig], metrics: Arc<RealtimeMetrics>) -> Self {
        let namespaces = apps
            .iter()
            .map(|config| {
                let app = Application::from(config);
                (
                    app.key.clone(),
                    Arc::new(Namespace::new(app, metrics.clone())),
                )
            })
            .collect();
        Self { namespaces }
    }

    /// Namespace for an app key.
    pub fn get(&self, app_key: &str) -> Option<Arc<Namespace>> {
        self.namespaces.get(app_key).cloned()
    }

    /// Namespace for an app key, or `UnknownApplication`.
    pub fn require(&self, app_key: &str) -> Result<Arc<Namespace>, BrokerError> {
        self.get(app_key)
            .ok_or_else(|| BrokerError::UnknownApplication(app_key.to_string()))
    }

    /// Registered app keys in sorted order.
    pub fn keys(&self) -> Vec<String> {
        self.namespaces.keys().cloned().collect()
    }

    /// All namespaces.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Namespace>> {
        self.namespaces.values()
    }

    /// Number of registered applications.
    pub fn len(&self) -> usize {
        self.namespaces.len()
    }

    /// Whether no applications are registered.
    pub fn is_empty(&self) -> bool {
        self.namespaces.is_empty()
    }
}
