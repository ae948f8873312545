//! Route definitions for the Quasar HTTP API.
//!
//! Trigger and query routes are mounted at the root so handlers see the full
//! request path, which is part of the signed message.

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = middleware::cors::build_cors_layer(&state.config.server.cors);

    Router::new()
        .merge(socket_routes())
        .merge(app_routes())
        .merge(health_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

/// WebSocket entry point per application
fn socket_routes() -> Router<AppState> {
    Router::new().route("/app/{app_key}", get(handlers::ws::ws_upgrade))
}

/// Signed trigger and channel queries
fn app_routes() -> Router<AppState> {
    Router::new()
        .route("/apps/{app_key}/events", post(handlers::events::trigger))
        .route("/apps/{app_key}/channels", get(handlers::channels::list_channels))
        .route(
            "/apps/{app_key}/channels/{channel}",
            get(handlers::channels::channel_info),
        )
        .route(
            "/apps/{app_key}/channels/{channel}/users",
            get(handlers::channels::channel_users),
        )
}

/// Health
fn health_routes() -> Router<AppState> {
    Router::new().route("/api/health", get(handlers::health::health))
}
