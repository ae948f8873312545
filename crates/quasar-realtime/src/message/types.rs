//! Inbound and outbound socket message type definitions.
//!
//! Frames are JSON text. Outbound events addressed to a channel carry the
//! wire name `"{channel}#{event}"`; internally the channel and event stay
//! separate so neither side can be confused by a `#` in a name.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Messages sent by the client to the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum InboundMessage {
    /// Join a channel.
    #[serde(rename = "subscribe")]
    Subscribe(SubscribePayload),
    /// Leave a channel.
    #[serde(rename = "unsubscribe")]
    Unsubscribe(UnsubscribePayload),
    /// Relay a `client-*` event to the rest of a channel.
    #[serde(rename = "channel:event")]
    ChannelEvent(ClientEventPayload),
    /// Client keepalive; answered with `quasar:pong`.
    #[serde(rename = "quasar:ping")]
    Ping,
    /// Reply to a server `quasar:ping`.
    #[serde(rename = "quasar:pong")]
    Pong,
    /// Client-initiated close; runs the same cleanup as a dropped transport.
    #[serde(rename = "disconnect")]
    Disconnect,
}

/// Payload of a `subscribe` message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscribePayload {
    /// Channel name.
    pub channel: String,
    /// Channel-auth signature, required for private and presence channels.
    #[serde(default, alias = "authKey")]
    pub auth: Option<String>,
    /// Raw presence payload exactly as signed.
    #[serde(default, alias = "channelData")]
    pub channel_data: Option<String>,
}

/// Payload of an `unsubscribe` message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnsubscribePayload {
    /// Channel name.
    pub channel: String,
}

/// Payload of a `channel:event` message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientEventPayload {
    /// Channel name.
    pub channel: String,
    /// Event name; must start with `client-`.
    pub event: String,
    /// Opaque event data.
    #[serde(default)]
    pub data: Value,
}

/// Broker-originated events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolEvent {
    /// Sent once after connect with the socket id.
    ConnectionEstablished,
    /// Connection-level error (unparseable frame, etc).
    Error,
    /// Server keepalive.
    Ping,
    /// Answer to a client keepalive.
    Pong,
    /// Subscription accepted.
    SubscriptionSucceeded,
    /// Private/presence subscription rejected.
    SubscriptionError,
    /// A user became present on a presence channel.
    MemberAdded,
    /// A user stopped being present on a presence channel.
    MemberRemoved,
}

impl ProtocolEvent {
    /// Wire name without any channel qualifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ConnectionEstablished => "quasar:connection_established",
            Self::Error => "quasar:error",
            Self::Ping => "quasar:ping",
            Self::Pong => "quasar:pong",
            Self::SubscriptionSucceeded => "quasar:subscription_succeeded",
            Self::SubscriptionError => "quasar:subscription_error",
            Self::MemberAdded => "quasar:member_added",
            Self::MemberRemoved => "quasar:member_removed",
        }
    }
}

/// Name of an outbound event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventName {
    /// Broker protocol event.
    Protocol(ProtocolEvent),
    /// Application event from a client relay or a trigger.
    Custom(String),
}

impl EventName {
    /// Event name as it appears after the `#`.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Protocol(p) => p.as_str(),
            Self::Custom(name) => name,
        }
    }
}

/// One message to deliver to a socket.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundMessage {
    /// Channel the event belongs to, if any.
    pub channel: Option<String>,
    /// Event name.
    pub event: EventName,
    /// Payload; `Null` is omitted on the wire.
    pub data: Value,
}

impl OutboundMessage {
    /// A protocol event not tied to a channel.
    pub fn protocol(event: ProtocolEvent, data: Value) -> Self {
        Self {
            channel: None,
            event: EventName::Protocol(event),
            data,
        }
    }

    /// A protocol event scoped to a channel.
    pub fn channel_protocol(channel: &str, event: ProtocolEvent, data: Value) -> Self {
        Self {
            channel: Some(channel.to_string()),
            event: EventName::Protocol(event),
            data,
        }
    }

    /// An application event on a channel.
    pub fn channel_event(channel: &str, event: &str, data: Value) -> Self {
        Self {
            channel: Some(channel.to_string()),
            event: EventName::Custom(event.to_string()),
            data,
        }
    }

    /// Wire event name: `"{channel}#{event}"` or the bare event.
    pub fn wire_event(&self) -> String {
        match &self.channel {
            Some(channel) => format!("{channel}#{}", self.event.as_str()),
            None => self.event.as_str().to_string(),
        }
    }

    /// Serializes to a JSON text frame.
    pub fn to_frame(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[derive(Serialize)]
struct WireFrame<'a> {
    event: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    channel: Option<&'a str>,
    #[serde(skip_serializing_if = "is_null")]
    data: &'a Value,
}

fn is_null(value: &&Value) -> bool {
    value.is_null()
}

impl Serialize for OutboundMessage {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        WireFrame {
            event: self.wire_event(),
            channel: self.channel.as_deref(),
            data: &self.data,
        }
        .serialize(serializer)
    }
}
