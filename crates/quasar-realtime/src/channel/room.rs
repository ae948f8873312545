//! Single room: the set of sockets subscribed to one channel.

use std::collections::HashSet;

use quasar_core::types::SocketId;

/// Sockets currently subscribed to one channel.
#[derive(Debug, Clone)]
pub struct Room {
    /// Channel name.
    pub name: String,
    /// Set of subscribed socket IDs.
    pub members: HashSet<SocketId>,
}

impl Room {
    /// Creates a new empty room.
    pub fn new(name: String) -> Self {
        Self {
            name,
            members: HashSet::new(),
        }
    }

    /// Adds a socket. Returns `false` if it was already a member.
    pub fn join(&mut self, socket_id: SocketId) -> bool {
        self.members.insert(socket_id)
    }

    /// Removes a socket. Returns `false` if it was not a member.
    pub fn leave(&mut self, socket_id: &SocketId) -> bool {
        self.members.remove(socket_id)
    }

    /// Whether the socket is in the room.
    pub fn contains(&self, socket_id: &SocketId) -> bool {
        self.members.contains(socket_id)
    }

    /// Returns member count.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns whether the room has any members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Members other than `exclude`.
    pub fn members_except(&self, exclude: Option<&SocketId>) -> Vec<SocketId> {
        self.members
            .iter()
            .filter(|id| Some(*id) != exclude)
            .copied()
            .collect()
    }
}
