//! Application builder and server runner.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use quasar_core::config::AppConfig;
use quasar_core::error::AppError;

use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    build_router(state)
}

/// Runs the broker until Ctrl+C or SIGTERM, then closes every socket and
/// waits up to `server.shutdown_grace_seconds` for connections to drain.
pub async fn run_server(config: AppConfig) -> Result<(), AppError> {
    let addr = config.server.bind_address();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    info!(address = %addr, apps = config.apps.len(), "Quasar server listening");

    serve(listener, AppState::from_config(config), shutdown_signal()).await
}

/// Serves on an already bound listener until `signal` resolves.
pub async fn serve(
    listener: TcpListener,
    state: AppState,
    signal: impl Future<Output = ()> + Send + 'static,
) -> Result<(), AppError> {
    let engine = Arc::clone(&state.realtime);
    let grace = Duration::from_secs(state.config.server.shutdown_grace_seconds);
    let stop = engine.shutdown_token();

    let app = build_app(state);
    let mut server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move { stop.cancelled().await })
            .await
    });

    tokio::select! {
        result = &mut server => return flatten(result),
        _ = signal => {}
    }

    info!("Shutdown signal received");
    engine.shutdown();

    match tokio::time::timeout(grace, &mut server).await {
        Ok(result) => flatten(result)?,
        Err(_) => {
            warn!(grace_secs = grace.as_secs(), "Connections still open after grace period");
            server.abort();
        }
    }

    info!("Server stopped");
    Ok(())
}

fn flatten(
    result: Result<std::io::Result<()>, tokio::task::JoinError>,
) -> Result<(), AppError> {
    match result {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(AppError::internal(format!("Server error: {e}"))),
        Err(e) => Err(AppError::internal(format!("Server task failed: {e}"))),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
