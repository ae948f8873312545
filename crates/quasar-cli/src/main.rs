//! Quasar CLI entry point.

use clap::Parser;

mod commands;
mod output;

use commands::{Cli, Commands};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match commands::load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            output::print_error(&format!("Failed to load configuration: {e}"));
            std::process::exit(1);
        }
    };

    // One-shot commands keep stdout clean unless RUST_LOG asks otherwise.
    let mut logging = config.logging.clone();
    if !matches!(cli.command, Commands::Serve(_)) {
        logging.level = "warn".to_string();
    }
    quasar_api::init_logging(&logging);

    if let Err(e) = cli.execute(config).await {
        output::print_error(&e.to_string());
        std::process::exit(1);
    }
}
