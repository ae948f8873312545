//! Tracing subscriber setup shared by the server binaries.

use tracing_subscriber::{EnvFilter, fmt};

use quasar_core::config::LoggingConfig;

/// Install the global subscriber.
///
/// `RUST_LOG` takes precedence over `logging.level`; `logging.format`
/// selects `json` output, anything else is pretty-printed.
pub fn init_logging(config: &LoggingConfig) {
    let rust_log = std::env::var("RUST_LOG").ok();
    let filter = EnvFilter::new(filter_directives(config, rust_log.as_deref()));

    match config.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

fn filter_directives(config: &LoggingConfig, rust_log: Option<&str>) -> String {
    match rust_log.map(str::trim) {
        Some(directives) if !directives.is_empty() => directives.to_string(),
        _ => config.level.clone(),
    }
}
