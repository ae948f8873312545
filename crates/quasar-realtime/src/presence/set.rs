//! Per-channel presence membership with join/leave edge detection.
//!
//! A user is present while at least one socket entry carries its `user_id`.
//! `MemberAdded` is produced only on the absent → present edge and
//! `MemberRemoved` only on the present → absent edge, so a user with several
//! tabs open is announced once and retired once.

use std::collections::HashMap;

use quasar_core::types::SocketId;

use super::member::{MemberView, PresenceMember};

/// A presence transition to announce to the room.
#[derive(Debug, Clone, PartialEq)]
pub enum PresenceEvent {
    /// First socket for this user joined.
    MemberAdded(PresenceMember),
    /// Last socket for this user left.
    MemberRemoved(PresenceMember),
}

#[derive(Debug, Clone)]
struct Entry {
    seq: u64,
    member: PresenceMember,
}

/// Membership table of one presence channel: socket → member.
#[derive(Debug, Default)]
pub struct PresenceSet {
    entries: HashMap<SocketId, Entry>,
    next_seq: u64,
}

impl PresenceSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or overwrites the entry for `socket_id`.
    ///
    /// Returns `MemberAdded` iff the user was not present before this call.
    /// A socket re-adding itself under the same user counts as already
    /// present. A socket switching to a different user must be removed first
    /// so the old user's leave edge is not lost.
    pub fn add(&mut self, socket_id: SocketId, member: PresenceMember) -> Option<PresenceEvent> {
        let was_present = self.is_user_present(&member.user_id);

        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.insert(
            socket_id,
            Entry {
                seq,
                member: member.clone(),
            },
        );

        (!was_present).then_some(PresenceEvent::MemberAdded(member))
    }

    /// Deletes the entry for `socket_id`.
    ///
    /// Returns the removed member (if any) and `MemberRemoved` iff no
    /// remaining entry shares its user.
    pub fn remove(
        &mut self,
        socket_id: &SocketId,
    ) -> (Option<PresenceMember>, Option<PresenceEvent>) {
        let Some(entry) = self.entries.remove(socket_id) else {
            return (None, None);
        };
        let member = entry.member;
        let event = (!self.is_user_present(&member.user_id))
            .then(|| PresenceEvent::MemberRemoved(member.clone()));
        (Some(member), event)
    }

    /// One entry per distinct user, in first-joined order, carrying the
    /// user's most recently written info.
    pub fn snapshot(&self) -> Vec<MemberView> {
        let mut ordered: Vec<&Entry> = self.entries.values().collect();
        ordered.sort_by_key(|e| e.seq);

        let mut views: Vec<MemberView> = Vec::new();
        let mut index: HashMap<&str, usize> = HashMap::new();
        for entry in ordered {
            let user_id = entry.member.user_id.as_str();
            match index.get(user_id) {
                Some(&i) => views[i].info = entry.member.user_info.clone(),
                None => {
                    index.insert(user_id, views.len());
                    views.push(entry.member.view());
                }
            }
        }
        views
    }

    /// The member registered for a socket.
    pub fn get(&self, socket_id: &SocketId) -> Option<&PresenceMember> {
        self.entries.get(socket_id).map(|e| &e.member)
    }

    /// Whether any socket carries this user id.
    pub fn is_user_present(&self, user_id: &str) -> bool {
        self.entries.values().any(|e| e.member.user_id == user_id)
    }

    /// Number of distinct users.
    pub fn user_count(&self) -> usize {
        let mut users: Vec<&str> = self
            .entries
            .values()
            .map(|e| e.member.user_id.as_str())
            .collect();
        users.sort_unstable();
        users.dedup();
        users.len()
    }

    /// Number of socket entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the set has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
