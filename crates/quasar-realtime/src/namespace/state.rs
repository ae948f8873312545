//! Mutable namespace state: sockets, rooms, and presence sets.
//!
//! Every operation here runs while the owning [`Namespace`](super::Namespace)
//! holds its lock, so a presence check and the mutation that follows it are
//! never interleaved with another operation on the same tenant. Delivery is a
//! non-blocking enqueue on each socket's bounded queue.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, warn};

use quasar_core::types::SocketId;

use crate::application::Application;
use crate::auth::authorize_channel;
use crate::channel::{ChannelName, ChannelType, RoomRegistry};
use crate::connection::handle::ConnectionHandle;
use crate::error::BrokerError;
use crate::message::builder::{
    build_member_added, build_member_removed, build_presence_succeeded,
    build_subscription_error, build_subscription_succeeded,
};
use crate::message::types::OutboundMessage;
use crate::message::validator::is_client_event;
use crate::metrics::RealtimeMetrics;
use crate::presence::{MemberView, PresenceEvent, PresenceMember, PresenceSet};

use super::socket::Socket;

/// Occupancy of one channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelInfo {
    /// Whether at least one socket is subscribed.
    pub occupied: bool,
    /// Number of subscribed sockets.
    pub subscription_count: usize,
    /// Distinct present users; presence channels only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_count: Option<usize>,
}

/// Sockets, rooms, and presence sets of one application.
#[derive(Debug)]
pub struct NamespaceState {
    sockets: HashMap<SocketId, Socket>,
    rooms: RoomRegistry,
    presence: HashMap<String, PresenceSet>,
    metrics: Arc<RealtimeMetrics>,
}

impl NamespaceState {
    /// Empty state.
    pub fn new(metrics: Arc<RealtimeMetrics>) -> Self {
        Self {
            sockets: HashMap::new(),
            rooms: RoomRegistry::new(),
            presence: HashMap::new(),
            metrics,
        }
    }

    /// Registers a new socket with no channel membership.
    pub fn connect(&mut self, handle: Arc<ConnectionHandle>) {
        self.sockets.insert(handle.id, Socket::new(handle));
    }

    /// Joins `channel`, authorizing signed channels first.
    ///
    /// An invalid channel name disconnects the socket. Missing or wrong
    /// credentials are reported to the socket as `subscription_error` and
    /// leave it connected but not joined.
    pub fn subscribe(
        &mut self,
        app: &Application,
        socket_id: &SocketId,
        channel: &str,
        auth: Option<&str>,
        channel_data: Option<&str>,
    ) -> Result<(), BrokerError> {
        let handle = self
            .handle(socket_id)
            .ok_or_else(|| BrokerError::SocketNotFound(socket_id.to_string()))?;

        let name = match ChannelName::parse(channel) {
            Ok(name) => name,
            Err(err) => {
                warn!(
                    socket_id = %socket_id,
                    app_key = %app.key,
                    channel,
                    "Invalid channel name, disconnecting socket"
                );
                self.disconnect(socket_id);
                handle.close();
                return Err(err);
            }
        };

        if name.kind().requires_auth() {
            if let Err(err) =
                authorize_channel(&app.key, &app.secret, socket_id, &name, auth, channel_data)
            {
                return Err(self.reject(&handle, &name, err));
            }
        }

        match name.kind() {
            ChannelType::Public | ChannelType::Private => {
                self.join(socket_id, &name);
                self.deliver(&handle, &build_subscription_succeeded(name.as_str()));
            }
            ChannelType::Presence => {
                let raw = channel_data.unwrap_or_default();
                let member = match PresenceMember::from_channel_data(*socket_id, raw) {
                    Ok(member) => member,
                    Err(err) => return Err(self.reject(&handle, &name, err)),
                };
                self.join(socket_id, &name);
                self.join_presence(&handle, &name, member);
            }
        }

        self.metrics.subscription_accepted();
        debug!(
            socket_id = %socket_id,
            app_key = %app.key,
            channel = %name,
            kind = name.kind().as_str(),
            "Subscribed"
        );
        Ok(())
    }

    /// Leaves `channel`. Returns whether the socket was a member.
    pub fn unsubscribe(&mut self, socket_id: &SocketId, channel: &str) -> bool {
        if let Some(socket) = self.sockets.get_mut(socket_id) {
            socket.joined.remove(channel);
        }
        let was_member = self.rooms.leave(channel, socket_id);
        let had_presence = self.leave_presence(channel, socket_id);

        if was_member {
            debug!(socket_id = %socket_id, channel, "Unsubscribed");
        }
        was_member || had_presence
    }

    /// Removes the socket and leaves every channel it joined.
    ///
    /// Returns `false` when the socket was already gone.
    pub fn disconnect(&mut self, socket_id: &SocketId) -> bool {
        let Some(socket) = self.sockets.remove(socket_id) else {
            return false;
        };
        for channel in &socket.joined {
            self.rooms.leave(channel, socket_id);
            self.leave_presence(channel, socket_id);
        }
        true
    }

    /// Relays a `client-*` event from a member of a private or presence
    /// channel to the rest of the room. Anything else is ignored.
    ///
    /// Returns the number of sockets the event was queued for.
    pub fn client_event(
        &mut self,
        socket_id: &SocketId,
        channel: &str,
        event: &str,
        data: Value,
    ) -> usize {
        let allowed = ChannelName::parse(channel)
            .map(|name| name.kind().allows_client_events())
            .unwrap_or(false);

        if !allowed || !is_client_event(event) || !self.rooms.is_member(channel, socket_id) {
            debug!(socket_id = %socket_id, channel, event, "Ignoring client event");
            return 0;
        }

        let msg = OutboundMessage::channel_event(channel, event, data);
        self.fan_out(channel, &msg, Some(socket_id))
    }

    /// Delivers `event` to every member of each channel except `exclude`.
    pub fn broadcast(
        &mut self,
        channels: &[String],
        event: &str,
        data: &Value,
        exclude: Option<&SocketId>,
    ) -> usize {
        channels
            .iter()
            .map(|channel| {
                let msg = OutboundMessage::channel_event(channel, event, data.clone());
                self.fan_out(channel, &msg, exclude)
            })
            .sum()
    }

    /// Whether the socket is connected to this namespace.
    pub fn is_connected(&self, socket_id: &SocketId) -> bool {
        self.sockets.contains_key(socket_id)
    }

    /// Number of connected sockets.
    pub fn connection_count(&self) -> usize {
        self.sockets.len()
    }

    /// Channels joined by a socket.
    pub fn joined_channels(&self, socket_id: &SocketId) -> Vec<String> {
        let mut channels: Vec<String> = self
            .sockets
            .get(socket_id)
            .map(|s| s.joined.iter().cloned().collect())
            .unwrap_or_default();
        channels.sort();
        channels
    }

    /// Occupancy of one channel.
    pub fn channel_info(&self, channel: &ChannelName) -> ChannelInfo {
        let subscription_count = self.rooms.subscriber_count(channel.as_str());
        let user_count = channel.is_presence().then(|| {
            self.presence
                .get(channel.as_str())
                .map(PresenceSet::user_count)
                .unwrap_or(0)
        });
        ChannelInfo {
            occupied: subscription_count > 0,
            subscription_count,
            user_count,
        }
    }

    /// Every channel with at least one subscriber, with its count.
    pub fn occupied_channels(&self) -> Vec<(String, usize)> {
        self.rooms.occupied()
    }

    /// Distinct users present on a presence channel.
    pub fn presence_members(&self, channel: &str) -> Vec<MemberView> {
        self.presence
            .get(channel)
            .map(PresenceSet::snapshot)
            .unwrap_or_default()
    }

    fn handle(&self, socket_id: &SocketId) -> Option<Arc<ConnectionHandle>> {
        self.sockets.get(socket_id).map(|s| s.handle.clone())
    }

    fn reject(
        &self,
        handle: &ConnectionHandle,
        channel: &ChannelName,
        err: BrokerError,
    ) -> BrokerError {
        warn!(
            socket_id = %handle.id,
            app_key = %handle.app_key,
            channel = %channel,
            error = %err,
            "Subscription rejected"
        );
        self.metrics.subscription_rejected();
        self.deliver(
            handle,
            &build_subscription_error(channel.as_str(), err.status_code()),
        );
        err
    }

    fn join(&mut self, socket_id: &SocketId, channel: &ChannelName) {
        self.rooms.join(channel.as_str(), *socket_id);
        if let Some(socket) = self.sockets.get_mut(socket_id) {
            socket.joined.insert(channel.to_string());
        }
    }

    fn join_presence(
        &mut self,
        handle: &ConnectionHandle,
        channel: &ChannelName,
        member: PresenceMember,
    ) {
        let set = self.presence.entry(channel.to_string()).or_default();
        let mut events = Vec::new();

        // A socket re-subscribing as someone else retires its old identity.
        let switched_user = set
            .get(&handle.id)
            .is_some_and(|previous| previous.user_id != member.user_id);
        if switched_user {
            if let (_, Some(event)) = set.remove(&handle.id) {
                events.push(event);
            }
        }
        if let Some(event) = set.add(handle.id, member.clone()) {
            events.push(event);
        }
        let members = set.snapshot();

        self.deliver(
            handle,
            &build_presence_succeeded(channel.as_str(), member.view(), members),
        );
        for event in events {
            self.announce(channel.as_str(), event, Some(&handle.id));
        }
    }

    fn leave_presence(&mut self, channel: &str, socket_id: &SocketId) -> bool {
        let Some(set) = self.presence.get_mut(channel) else {
            return false;
        };
        let (removed, event) = set.remove(socket_id);
        if set.is_empty() {
            self.presence.remove(channel);
        }
        if let Some(event) = event {
            self.announce(channel, event, None);
        }
        removed.is_some()
    }

    fn announce(&self, channel: &str, event: PresenceEvent, exclude: Option<&SocketId>) -> usize {
        let msg = match event {
            PresenceEvent::MemberAdded(member) => build_member_added(channel, member.view()),
            PresenceEvent::MemberRemoved(member) => build_member_removed(channel, member.view()),
        };
        self.fan_out(channel, &msg, exclude)
    }

    fn fan_out(&self, channel: &str, msg: &OutboundMessage, exclude: Option<&SocketId>) -> usize {
        let frame = match msg.to_frame() {
            Ok(frame) => frame,
            Err(e) => {
                error!(channel, error = %e, "Failed to serialize broadcast");
                return 0;
            }
        };

        let mut delivered = 0;
        for socket_id in self.rooms.members_except(channel, exclude) {
            let Some(socket) = self.sockets.get(&socket_id) else {
                continue;
            };
            if socket.handle.send_frame(frame.clone()) {
                self.metrics.message_sent();
                delivered += 1;
            } else {
                self.metrics.message_dropped();
            }
        }
        delivered
    }

    fn deliver(&self, handle: &ConnectionHandle, msg: &OutboundMessage) -> bool {
        let sent = handle.send(msg);
        if sent {
            self.metrics.message_sent();
        } else {
            self.metrics.message_dropped();
        }
        sent
    }
}
