//! Channel name grammar and classification.
//!
//! A channel name is `^(?:(private|presence)-)?([-a-zA-Z0-9_=@,.;]+)$`. The
//! optional prefix selects the channel type, so the same string always
//! classifies the same way regardless of broker state.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::BrokerError;

static CHANNEL_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(private|presence)-)?([-a-zA-Z0-9_=@,.;]+)$")
        .unwrap_or_else(|e| unreachable!("channel grammar is a valid regex: {e}"))
});

/// Kind of channel, determined purely by its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelType {
    /// Anyone may subscribe.
    Public,
    /// Subscription requires a channel-auth signature.
    Private,
    /// Signed subscription plus member tracking.
    Presence,
}

impl ChannelType {
    /// Whether subscribing requires a channel-auth signature.
    pub fn requires_auth(&self) -> bool {
        !matches!(self, Self::Public)
    }

    /// Whether clients may relay `client-*` events on this channel.
    pub fn allows_client_events(&self) -> bool {
        self.requires_auth()
    }

    /// Converts to string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Private => "private",
            Self::Presence => "presence",
        }
    }
}

/// A validated channel name together with its type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChannelName {
    name: String,
    kind: ChannelType,
}

impl ChannelName {
    /// Validates a channel name against the grammar.
    pub fn parse(raw: &str) -> Result<Self, BrokerError> {
        let captures = CHANNEL_NAME
            .captures(raw)
            .ok_or_else(|| BrokerError::ProtocolViolation(raw.to_string()))?;

        let kind = match captures.get(1).map(|m| m.as_str()) {
            Some("private") => ChannelType::Private,
            Some("presence") => ChannelType::Presence,
            _ => ChannelType::Public,
        };

        Ok(Self {
            name: raw.to_string(),
            kind,
        })
    }

    /// The full channel name, including any prefix.
    pub fn as_str(&self) -> &str {
        &self.name
    }

    /// The channel's type.
    pub fn kind(&self) -> ChannelType {
        self.kind
    }

    /// Shorthand for `kind() == ChannelType::Presence`.
    pub fn is_presence(&self) -> bool {
        self.kind == ChannelType::Presence
    }
}

impl fmt::Display for ChannelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
