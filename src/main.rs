//! Quasar Server: multi-tenant presence-aware pub/sub broker
//!
//! Main entry point that loads configuration, sets up logging and serves
//! the socket and HTTP endpoints until a shutdown signal arrives.

use quasar_core::config::AppConfig;
use quasar_core::error::AppError;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    quasar_api::init_logging(&config.logging);

    tracing::info!(
        "Starting Quasar v{} with {} application(s)",
        env!("CARGO_PKG_VERSION"),
        config.apps.len()
    );

    if let Err(e) = quasar_api::run_server(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from an explicit file or the per-environment files
fn load_configuration() -> Result<AppConfig, AppError> {
    match std::env::var("QUASAR_CONFIG") {
        Ok(path) => AppConfig::load_from(&path),
        Err(_) => {
            let env = std::env::var("QUASAR_ENV").unwrap_or_else(|_| "development".to_string());
            AppConfig::load(&env)
        }
    }
}
