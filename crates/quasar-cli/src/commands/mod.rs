//! CLI command definitions and dispatch.

pub mod apps;
pub mod serve;
pub mod sign;
pub mod trigger;

use clap::{Parser, Subcommand};

use quasar_core::config::{AppConfig, ApplicationConfig};
use quasar_core::error::AppError;

use crate::output::OutputFormat;

/// Quasar: multi-tenant presence-aware pub/sub broker
#[derive(Debug, Parser)]
#[command(name = "quasar", version, about, long_about = None)]
pub struct Cli {
    /// Path to a configuration file. Without it, `config/default.toml` and
    /// `config/{QUASAR_ENV}.toml` are merged.
    #[arg(short, long, env = "QUASAR_CONFIG")]
    pub config: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the broker
    Serve(serve::ServeArgs),
    /// Compute channel-auth or request signatures
    Sign(sign::SignArgs),
    /// Send a signed trigger to a running broker
    Trigger(trigger::TriggerArgs),
    /// List configured applications
    Apps,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: AppConfig) -> Result<(), AppError> {
        match &self.command {
            Commands::Serve(args) => serve::execute(args, config).await,
            Commands::Sign(args) => sign::execute(args, &config),
            Commands::Trigger(args) => trigger::execute(args, &config).await,
            Commands::Apps => {
                apps::execute(&config, self.format);
                Ok(())
            }
        }
    }
}

/// Helper: load configuration from an explicit file or the environment
pub fn load_config(path: Option<&str>) -> Result<AppConfig, AppError> {
    match path {
        Some(path) => AppConfig::load_from(path),
        None => {
            let env = std::env::var("QUASAR_ENV").unwrap_or_else(|_| "development".to_string());
            AppConfig::load(&env)
        }
    }
}

/// Helper: find a configured application by key
pub fn find_app<'a>(config: &'a AppConfig, key: &str) -> Result<&'a ApplicationConfig, AppError> {
    config
        .apps
        .iter()
        .find(|app| app.key == key)
        .ok_or_else(|| AppError::not_found(format!("No application with key '{key}'")))
}
