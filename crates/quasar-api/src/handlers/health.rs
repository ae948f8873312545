//! Health check handler.

use axum::Json;
use axum::extract::State;
use chrono::Utc;
use serde::Serialize;

use quasar_realtime::metrics::MetricsSnapshot;
use quasar_realtime::server::AppStatus;

use crate::state::AppState;

/// Health report.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always `"ok"` while the server answers.
    pub status: &'static str,
    /// Crate version.
    pub version: &'static str,
    /// Seconds since startup.
    pub uptime_seconds: i64,
    /// Open sockets across all applications.
    pub connections: usize,
    /// Per-application connection counts.
    pub apps: Vec<AppStatus>,
    /// Broker counters.
    pub metrics: MetricsSnapshot,
}

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: (Utc::now() - state.started_at).num_seconds(),
        connections: state.realtime.connections.connection_count(),
        apps: state.realtime.app_statuses(),
        metrics: state.realtime.metrics_snapshot(),
    })
}
