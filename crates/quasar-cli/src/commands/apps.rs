//! List configured applications.

use serde::Serialize;
use tabled::Tabled;

use quasar_core::config::AppConfig;

use crate::output::{self, OutputFormat};

/// One row of the apps listing. Secrets are never printed.
#[derive(Debug, Serialize, Tabled)]
pub struct AppRow {
    /// App key
    pub key: String,
    /// Number of configured options
    pub options: usize,
}

/// Execute the apps command
pub fn execute(config: &AppConfig, format: OutputFormat) {
    let rows: Vec<AppRow> = config
        .apps
        .iter()
        .map(|app| AppRow {
            key: app.key.clone(),
            options: app.options.len(),
        })
        .collect();
    output::print_list(&rows, format);
}
