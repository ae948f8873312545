//! Message validation rules.

use crate::error::BrokerError;

/// Prefix every client-originated relay event must carry.
pub const CLIENT_EVENT_PREFIX: &str = "client-";

/// Validates a raw inbound frame before parsing.
pub fn validate_inbound(raw: &str, max_size: usize) -> Result<(), BrokerError> {
    if raw.len() > max_size {
        return Err(BrokerError::Validation(format!(
            "Message exceeds maximum size of {max_size} bytes"
        )));
    }

    if raw.trim().is_empty() {
        return Err(BrokerError::Validation("Empty message".to_string()));
    }

    Ok(())
}

/// Whether an event name follows the client-event naming convention.
pub fn is_client_event(event: &str) -> bool {
    event.len() > CLIENT_EVENT_PREFIX.len() && event.starts_with(CLIENT_EVENT_PREFIX)
}

/// Normalizes a triggered event name: backslashes become dots.
pub fn normalize_event_name(event: &str) -> String {
    event.replace('\\', ".")
}
