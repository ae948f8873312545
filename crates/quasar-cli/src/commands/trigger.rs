//! Send a signed trigger to a running broker.

use clap::Args;
use serde_json::{Value, json};

use quasar_core::config::AppConfig;
use quasar_core::error::AppError;
use quasar_realtime::auth::SignatureVerifier;

use crate::output;

/// Arguments for the trigger command
#[derive(Debug, Args)]
pub struct TriggerArgs {
    /// Broker base URL
    #[arg(short, long, default_value = "http://127.0.0.1:6001")]
    pub url: String,
    /// App key
    #[arg(short, long)]
    pub app: String,
    /// Target channel; repeat for several
    #[arg(short, long = "channel", required = true)]
    pub channels: Vec<String>,
    /// Event name
    #[arg(short, long)]
    pub event: String,
    /// Event data as JSON; plain text is sent as a string
    #[arg(short, long, default_value = "null")]
    pub data: String,
    /// Socket to exclude from delivery
    #[arg(short, long)]
    pub socket_id: Option<String>,
}

/// Execute the trigger command
pub async fn execute(args: &TriggerArgs, config: &AppConfig) -> Result<(), AppError> {
    let app = super::find_app(config, &args.app)?;

    let data: Value =
        serde_json::from_str(&args.data).unwrap_or_else(|_| Value::String(args.data.clone()));
    let mut body = json!({
        "channels": args.channels,
        "event": args.event,
        "data": data,
    });
    if let Some(socket_id) = &args.socket_id {
        body["socket_id"] = Value::String(socket_id.clone());
    }
    let body = body.to_string();

    let path = format!("/apps/{}/events", app.key);
    let token = SignatureVerifier::sign(
        &app.secret,
        &SignatureVerifier::request_message("POST", &path, &body),
    );

    let url = format!("{}{}", args.url.trim_end_matches('/'), path);
    let response = reqwest::Client::new()
        .post(&url)
        .header("Authorization", format!("Bearer {token}"))
        .header("Content-Type", "application/json")
        .body(body)
        .send()
        .await
        .map_err(|e| AppError::internal(format!("Request to {url} failed: {e}")))?;

    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| AppError::internal(format!("Failed to read response: {e}")))?;

    if status.is_success() {
        output::print_success(&format!("Triggered '{}' on {} channel(s)", args.event, args.channels.len()));
        Ok(())
    } else {
        Err(AppError::internal(format!("Broker answered {status}: {text}")))
    }
}
