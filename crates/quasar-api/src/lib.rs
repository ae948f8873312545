//! # quasar-api
//!
//! HTTP layer for the Quasar broker built on Axum.
//!
//! Provides the WebSocket endpoint, the signed trigger and channel query
//! endpoints, health reporting, middleware (CORS, logging), error
//! mapping, and the tracing subscriber setup used by the binaries.

pub mod app;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;
pub mod telemetry;

pub use app::{build_app, run_server, serve};
pub use error::ApiError;
pub use state::AppState;
pub use telemetry::init_logging;
