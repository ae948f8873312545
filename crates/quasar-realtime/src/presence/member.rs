//! Presence member payloads.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use quasar_core::types::SocketId;

use crate::error::BrokerError;

/// One socket's membership in a presence channel.
#[derive(Debug, Clone, PartialEq)]
pub struct PresenceMember {
    /// Socket that subscribed.
    pub socket_id: SocketId,
    /// Application-defined user identity. Several sockets may share it.
    pub user_id: String,
    /// Opaque user info, passed through to other members untouched.
    pub user_info: Value,
}

impl PresenceMember {
    /// Builds a member from the raw `channel_data` string a client signed.
    ///
    /// The payload is a JSON object with a `user_id` (string or number) and
    /// optional `user_info`.
    pub fn from_channel_data(socket_id: SocketId, raw: &str) -> Result<Self, BrokerError> {
        let data: ChannelData = serde_json::from_str(raw)
            .map_err(|e| BrokerError::Validation(format!("Invalid channel_data: {e}")))?;

        let user_id = match data.user_id {
            Value::String(s) if !s.is_empty() => s,
            Value::Number(n) => n.to_string(),
            _ => {
                return Err(BrokerError::Validation(
                    "channel_data.user_id must be a non-empty string or number".to_string(),
                ));
            }
        };

        Ok(Self {
            socket_id,
            user_id,
            user_info: data.user_info,
        })
    }

    /// Public view sent to other clients.
    pub fn view(&self) -> MemberView {
        MemberView {
            id: self.user_id.clone(),
            info: self.user_info.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChannelData {
    #[serde(alias = "userId")]
    user_id: Value,
    #[serde(default, alias = "userInfo")]
    user_info: Value,
}

/// Member as seen by clients: `{"id": ..., "info": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberView {
    /// User ID.
    pub id: String,
    /// User info.
    pub info: Value,
}
