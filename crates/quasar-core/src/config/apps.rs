//! Registered application (tenant) definitions.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One tenant: its public key, signing secret, and free-form options.
#[derive(Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Public app key. Clients connect to `/app/{key}`.
    pub key: String,
    /// Shared HMAC secret.
    pub secret: String,
    /// Arbitrary per-app options; the broker does not interpret them.
    #[serde(default)]
    pub options: HashMap<String, serde_json::Value>,
}

impl std::fmt::Debug for ApplicationConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApplicationConfig")
            .field("key", &self.key)
            .field("secret", &"<redacted>")
            .field("options", &self.options)
            .finish()
    }
}
