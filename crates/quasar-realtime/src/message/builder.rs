//! Builder helpers for constructing outbound protocol messages.

use serde_json::{Value, json};

use quasar_core::types::SocketId;

use crate::presence::member::MemberView;

use super::types::{OutboundMessage, ProtocolEvent};

/// Build the greeting sent right after a socket connects.
pub fn build_connection_established(socket_id: &SocketId, activity_timeout: u64) -> OutboundMessage {
    OutboundMessage::protocol(
        ProtocolEvent::ConnectionEstablished,
        json!({
            "socket_id": socket_id.to_string(),
            "activity_timeout": activity_timeout,
        }),
    )
}

/// Build a connection-level error.
pub fn build_error(message: &str) -> OutboundMessage {
    OutboundMessage::protocol(ProtocolEvent::Error, json!({ "message": message }))
}

/// Build a public/private subscription acknowledgement.
pub fn build_subscription_succeeded(channel: &str) -> OutboundMessage {
    OutboundMessage::channel_protocol(channel, ProtocolEvent::SubscriptionSucceeded, Value::Null)
}

/// Build a presence subscription acknowledgement with the member roster.
pub fn build_presence_succeeded(
    channel: &str,
    me: MemberView,
    members: Vec<MemberView>,
) -> OutboundMessage {
    OutboundMessage::channel_protocol(
        channel,
        ProtocolEvent::SubscriptionSucceeded,
        json!({ "me": me, "members": members }),
    )
}

/// Build a subscription rejection carrying an HTTP-style status code.
pub fn build_subscription_error(channel: &str, code: u16) -> OutboundMessage {
    OutboundMessage::channel_protocol(channel, ProtocolEvent::SubscriptionError, json!(code))
}

/// Build a presence join notification.
pub fn build_member_added(channel: &str, member: MemberView) -> OutboundMessage {
    OutboundMessage::channel_protocol(channel, ProtocolEvent::MemberAdded, json!(member))
}

/// Build a presence leave notification.
pub fn build_member_removed(channel: &str, member: MemberView) -> OutboundMessage {
    OutboundMessage::channel_protocol(channel, ProtocolEvent::MemberRemoved, json!(member))
}
