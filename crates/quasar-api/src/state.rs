//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use quasar_core::config::AppConfig;
use quasar_realtime::server::RealtimeEngine;

/// Shared dependencies passed to every handler via `State<AppState>`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Broker engine
    pub realtime: Arc<RealtimeEngine>,
    /// When the server started
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Builds state around an engine.
    pub fn new(config: Arc<AppConfig>, realtime: Arc<RealtimeEngine>) -> Self {
        Self {
            config,
            realtime,
            started_at: Utc::now(),
        }
    }

    /// Builds state with a fresh engine for `config`.
    pub fn from_config(config: AppConfig) -> Self {
        let realtime = Arc::new(RealtimeEngine::new(&config));
        Self::new(Arc::new(config), realtime)
    }
}
