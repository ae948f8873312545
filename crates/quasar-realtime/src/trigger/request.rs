//! Trigger request parsing.
//!
//! The body is JSON unless the content type says form-encoded. `channels`
//! may be a real array or a JSON-encoded array string, and `data` that is
//! itself a JSON string is decoded once so subscribers receive the value.

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::error::BrokerError;
use crate::message::validator::normalize_event_name;

/// An HTTP trigger call as received.
#[derive(Debug, Clone, Copy)]
pub struct TriggerRequest<'a> {
    /// App key from the request path.
    pub app_key: &'a str,
    /// HTTP method.
    pub method: &'a str,
    /// Request path, without query string.
    pub path: &'a str,
    /// Raw body exactly as received.
    pub body: &'a str,
    /// `Authorization` header value.
    pub authorization: Option<&'a str>,
    /// `Content-Type` header value.
    pub content_type: Option<&'a str>,
}

/// The event a trigger asks to publish.
#[derive(Debug, Clone, PartialEq)]
pub struct TriggerEvent {
    /// Target channel names, unvalidated.
    pub channels: Vec<String>,
    /// Event name with backslashes replaced by dots.
    pub event: String,
    /// Payload passed through to subscribers.
    pub data: Value,
    /// Socket to exclude from delivery.
    pub socket_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct JsonFields {
    channels: Option<Value>,
    channel: Option<String>,
    event: Option<String>,
    data: Option<Value>,
    #[serde(alias = "socketId")]
    socket_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FormFields {
    channels: Option<String>,
    channel: Option<String>,
    event: Option<String>,
    data: Option<String>,
    #[serde(alias = "socketId")]
    socket_id: Option<String>,
}

impl From<FormFields> for JsonFields {
    fn from(form: FormFields) -> Self {
        Self {
            channels: form.channels.map(Value::String),
            channel: form.channel,
            event: form.event,
            data: form.data.map(Value::String),
            socket_id: form.socket_id,
        }
    }
}

impl TriggerEvent {
    /// Parses a trigger body.
    pub fn parse(body: &str, content_type: Option<&str>) -> Result<Self, BrokerError> {
        let fields: JsonFields = if is_form(content_type) {
            serde_urlencoded::from_str::<FormFields>(body)
                .map_err(|e| BrokerError::Validation(format!("Invalid form body: {e}")))?
                .into()
        } else {
            serde_json::from_str(body)
                .map_err(|e| BrokerError::Validation(format!("Invalid JSON body: {e}")))?
        };

        let channels = parse_channels(fields.channels, fields.channel)?;

        let event = fields
            .event
            .filter(|e| !e.is_empty())
            .ok_or_else(|| BrokerError::Validation("event is required".to_string()))?;

        Ok(Self {
            channels,
            event: normalize_event_name(&event),
            data: decode_data(fields.data),
            socket_id: fields.socket_id.filter(|s| !s.is_empty()),
        })
    }
}

fn is_form(content_type: Option<&str>) -> bool {
    content_type.is_some_and(|ct| {
        ct.trim()
            .to_ascii_lowercase()
            .starts_with("application/x-www-form-urlencoded")
    })
}

fn parse_channels(
    channels: Option<Value>,
    channel: Option<String>,
) -> Result<Vec<String>, BrokerError> {
    let items = match channels {
        Some(Value::Array(items)) => items,
        Some(Value::String(encoded)) => serde_json::from_str::<Vec<Value>>(&encoded)
            .map_err(|e| BrokerError::Validation(format!("channels is not a JSON array: {e}")))?,
        Some(_) => {
            return Err(BrokerError::Validation(
                "channels must be an array of strings".to_string(),
            ));
        }
        None => match channel {
            Some(channel) => vec![Value::String(channel)],
            None => return Err(BrokerError::Validation("channels is required".to_string())),
        },
    };

    Ok(items
        .into_iter()
        .filter_map(|item| match item {
            Value::String(name) => Some(name),
            other => {
                warn!(channel = %other, "Skipping non-string channel");
                None
            }
        })
        .collect())
}

fn decode_data(data: Option<Value>) -> Value {
    match data {
        Some(Value::String(encoded)) => {
            serde_json::from_str(&encoded).unwrap_or(Value::String(encoded))
        }
        Some(value) => value,
        None => Value::Null,
    }
}
