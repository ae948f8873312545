//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod app;
pub mod apps;
pub mod logging;
pub mod realtime;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

pub use self::app::{CorsConfig, ServerConfig};
pub use self::apps::ApplicationConfig;
pub use self::logging::LoggingConfig;
pub use self::realtime::RealtimeConfig;

use crate::error::AppError;

/// Prefix for environment variable overrides (`QUASAR__SERVER__PORT=7000`).
const ENV_PREFIX: &str = "QUASAR";

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Listener settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Socket engine settings.
    #[serde(default)]
    pub realtime: RealtimeConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Registered applications.
    #[serde(default)]
    pub apps: Vec<ApplicationConfig>,
}

impl AppConfig {
    /// Load configuration for a deployment environment.
    ///
    /// Merges `config/default.toml`, then `config/{env}.toml`, then
    /// environment variables prefixed with `QUASAR__`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false));
        Self::finish(builder)
    }

    /// Load configuration from one explicit file plus environment overrides.
    pub fn load_from(path: &str) -> Result<Self, AppError> {
        let builder =
            config::Config::builder().add_source(config::File::with_name(path).required(true));
        Self::finish(builder)
    }

    /// Parse configuration from an in-memory TOML document.
    pub fn from_toml(source: &str) -> Result<Self, AppError> {
        let config: Self = config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn finish(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, AppError> {
        let config = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let config: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;
        config.validate()?;
        tracing::debug!(
            apps = config.apps.len(),
            bind = %config.server.bind_address(),
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Check invariants the broker relies on at startup.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.apps.is_empty() {
            return Err(AppError::configuration(
                "At least one application must be configured under [[apps]]",
            ));
        }

        let mut seen = HashSet::new();
        for app in &self.apps {
            if app.key.trim().is_empty() {
                return Err(AppError::configuration("Application key must not be empty"));
            }
            if app.secret.is_empty() {
                return Err(AppError::configuration(format!(
                    "Application '{}' has an empty secret",
                    app.key
                )));
            }
            if !seen.insert(app.key.as_str()) {
                return Err(AppError::configuration(format!(
                    "Duplicate application key '{}'",
                    app.key
                )));
            }
        }

        let realtime = &self.realtime;
        for (name, value) in [
            ("socket_buffer_size", realtime.socket_buffer_size as u64),
            ("ping_interval_seconds", realtime.ping_interval_seconds),
            ("ping_timeout_seconds", realtime.ping_timeout_seconds),
            ("max_message_size_bytes", realtime.max_message_size_bytes as u64),
        ] {
            if value == 0 {
                return Err(AppError::configuration(format!(
                    "realtime.{name} must be greater than zero"
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = r#"
        [server]
        port = 7001

        [logging]
        format = "json"

        [[apps]]
        key = "app-key"
        secret = "app-secret"
        options = { name = "demo", cluster = 3 }

        [[apps]]
        key = "other"
        secret = "shh"
    "#;

    #[test]
    fn test_parses_apps_and_defaults() {
        let config = AppConfig::from_toml(SAMPLE).expect("valid config");
        assert_eq!(config.server.port, 7001);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.realtime.socket_buffer_size, 256);
        assert_eq!(config.apps.len(), 2);
        assert_eq!(config.apps[0].key, "app-key");
        assert_eq!(
            config.apps[0].options.get("name"),
            Some(&serde_json::json!("demo"))
        );
        assert!(config.apps[1].options.is_empty());
    }

    #[test]
    fn test_rejects_missing_apps() {
        let err = AppConfig::from_toml("[server]\nport = 1\n").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
    }

    #[test]
    fn test_rejects_duplicate_keys() {
        let doc = r#"
            [[apps]]
            key = "dup"
            secret = "a"
            [[apps]]
            key = "dup"
            secret = "b"
        "#;
        let err = AppConfig::from_toml(doc).unwrap_err();
        assert!(err.message.contains("Duplicate"));
    }

    #[test]
    fn test_rejects_empty_secret() {
        let doc = "[[apps]]\nkey = \"k\"\nsecret = \"\"\n";
        assert!(AppConfig::from_toml(doc).is_err());
    }

    #[test]
    fn test_rejects_zero_ping_interval() {
        let doc = "[realtime]\nping_interval_seconds = 0\n[[apps]]\nkey = \"k\"\nsecret = \"s\"\n";
        let err = AppConfig::from_toml(doc).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
        assert!(err.message.contains("ping_interval_seconds"));
    }

    #[test]
    fn test_rejects_zero_realtime_limits() {
        for field in [
            "socket_buffer_size",
            "ping_timeout_seconds",
            "max_message_size_bytes",
        ] {
            let doc = format!("[realtime]\n{field} = 0\n[[apps]]\nkey = \"k\"\nsecret = \"s\"\n");
            let err = AppConfig::from_toml(&doc).unwrap_err();
            assert!(err.message.contains(field), "{field}: {}", err.message);
        }
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = AppConfig::from_toml(SAMPLE).expect("valid config");
        let rendered = format!("{:?}", config.apps[0]);
        assert!(!rendered.contains("app-secret"));
    }
}
