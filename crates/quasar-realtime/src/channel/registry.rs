//! Room index for one namespace: channel name → room.

use std::collections::HashMap;

use quasar_core::types::SocketId;

use super::room::Room;

/// All non-empty rooms of a namespace.
///
/// Not synchronized on its own; the owning namespace serializes access.
#[derive(Debug, Default)]
pub struct RoomRegistry {
    rooms: HashMap<String, Room>,
}

impl RoomRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a socket to a channel's room, creating the room on first join.
    pub fn join(&mut self, channel: &str, socket_id: SocketId) -> bool {
        self.rooms
            .entry(channel.to_string())
            .or_insert_with(|| Room::new(channel.to_string()))
            .join(socket_id)
    }

    /// Removes a socket from a channel's room, dropping the room once empty.
    pub fn leave(&mut self, channel: &str, socket_id: &SocketId) -> bool {
        let Some(room) = self.rooms.get_mut(channel) else {
            return false;
        };
        let removed = room.leave(socket_id);
        if room.is_empty() {
            self.rooms.remove(channel);
        }
        removed
    }

    /// Whether the socket is subscribed to the channel.
    pub fn is_member(&self, channel: &str, socket_id: &SocketId) -> bool {
        self.rooms
            .get(channel)
            .is_some_and(|room| room.contains(socket_id))
    }

    /// Subscribers of a channel, minus `exclude`.
    pub fn members_except(&self, channel: &str, exclude: Option<&SocketId>) -> Vec<SocketId> {
        self.rooms
            .get(channel)
            .map(|room| room.members_except(exclude))
            .unwrap_or_default()
    }

    /// Subscriber count of a channel.
    pub fn subscriber_count(&self, channel: &str) -> usize {
        self.rooms.get(channel).map(Room::len).unwrap_or(0)
    }

    /// Occupied channels with their subscriber counts.
    pub fn occupied(&self) -> Vec<(String, usize)> {
        self.rooms
            .values()
            .map(|room| (room.name.clone(), room.len()))
            .collect()
    }

    /// Returns total number of occupied rooms.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}
