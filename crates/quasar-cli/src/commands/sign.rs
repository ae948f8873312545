//! Signature helpers for client and backend integrations.

use clap::{Args, Subcommand};

use quasar_core::config::AppConfig;
use quasar_core::error::AppError;
use quasar_core::types::SocketId;
use quasar_realtime::auth::SignatureVerifier;

/// Arguments for sign commands
#[derive(Debug, Args)]
pub struct SignArgs {
    /// Sign subcommand
    #[command(subcommand)]
    pub command: SignCommand,
}

/// Sign subcommands
#[derive(Debug, Subcommand)]
pub enum SignCommand {
    /// Channel-auth token for a private or presence subscription
    Channel {
        /// App key
        #[arg(short, long)]
        app: String,
        /// Socket ID from `quasar:connection_established`
        #[arg(short, long)]
        socket_id: String,
        /// Channel name
        #[arg(short, long)]
        channel: String,
        /// Raw presence `channel_data`, signed byte-for-byte
        #[arg(short, long)]
        data: Option<String>,
    },
    /// Bearer token for an HTTP request
    Trigger {
        /// App key
        #[arg(short, long)]
        app: String,
        /// HTTP method
        #[arg(short, long, default_value = "POST")]
        method: String,
        /// Request path, e.g. `/apps/KEY/events`
        #[arg(short, long)]
        path: String,
        /// Raw request body
        #[arg(short, long, default_value = "")]
        body: String,
    },
}

/// Execute sign commands
pub fn execute(args: &SignArgs, config: &AppConfig) -> Result<(), AppError> {
    match &args.command {
        SignCommand::Channel {
            app,
            socket_id,
            channel,
            data,
        } => {
            let app = super::find_app(config, app)?;
            let socket_id: SocketId = socket_id
                .parse()
                .map_err(|e| AppError::validation(format!("Invalid socket ID: {e}")))?;
            let message =
                SignatureVerifier::channel_auth_message(&socket_id, channel, data.as_deref());
            println!("{}", SignatureVerifier::sign(&app.secret, &message));
        }
        SignCommand::Trigger {
            app,
            method,
            path,
            body,
        } => {
            let app = super::find_app(config, app)?;
            let message = SignatureVerifier::request_message(method, path, body);
            println!("Bearer {}", SignatureVerifier::sign(&app.secret, &message));
        }
    }
    Ok(())
}
