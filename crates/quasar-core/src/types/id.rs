//! Socket identifier.
//!
//! A socket id is handed to the client on connect and is the value it signs
//! over during the channel-auth handshake, so its string form is part of the
//! wire protocol.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity of one socket connection, unique for the process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SocketId(pub Uuid);

impl SocketId {
    /// Allocate a fresh random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create an identifier from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Return the inner UUID value.
    pub fn into_uuid(self) -> Uuid {
        self.0
    }
}

impl Default for SocketId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SocketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SocketId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl From<Uuid> for SocketId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_socket_id_unique() {
        let a = SocketId::new();
        let b = SocketId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn test_socket_id_display_matches_uuid() {
        let uuid = Uuid::new_v4();
        assert_eq!(SocketId::from_uuid(uuid).to_string(), uuid.to_string());
    }

    #[test]
    fn test_socket_id_from_str() {
        let id = SocketId::new();
        let parsed: SocketId = id.to_string().parse().expect("should parse");
        assert_eq!(parsed, id);
        assert!("not-a-socket".parse::<SocketId>().is_err());
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let id = SocketId::new();
        let json = serde_json::to_string(&id).expect("serialize");
        assert_eq!(json, format!("\"{id}\""));
    }
}
