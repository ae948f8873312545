//! Channel-auth handshake for private and presence subscriptions.

use quasar_core::types::SocketId;

use crate::channel::ChannelName;
use crate::error::BrokerError;

use super::signature::SignatureVerifier;

/// Checks the credentials a socket supplied to join a signed channel.
///
/// `auth` is normally the bare hex signature. Pusher client libraries send
/// it as `"{app_key}:{signature}"`, so that form is also accepted when the
/// prefix is this application's own key; any other prefix fails
/// verification. Presence channels additionally need the raw
/// `channel_data` the signature was computed over.
pub fn authorize_channel(
    app_key: &str,
    secret: &str,
    socket_id: &SocketId,
    channel: &ChannelName,
    auth: Option<&str>,
    channel_data: Option<&str>,
) -> Result<(), BrokerError> {
    let auth = auth
        .filter(|a| !a.is_empty())
        .ok_or_else(|| BrokerError::AuthMissing(format!("auth is required for {channel}")))?;

    let channel_data = if channel.is_presence() {
        let data = channel_data.filter(|d| !d.is_empty()).ok_or_else(|| {
            BrokerError::AuthMissing(format!("channel_data is required for {channel}"))
        })?;
        Some(data)
    } else {
        None
    };

    let signature = auth
        .strip_prefix(app_key)
        .and_then(|rest| rest.strip_prefix(':'))
        .unwrap_or(auth);

    let message = SignatureVerifier::channel_auth_message(socket_id, channel.as_str(), channel_data);
    if SignatureVerifier::verify(secret, &message, signature) {
        Ok(())
    } else {
        Err(BrokerError::AuthInvalid(channel.to_string()))
    }
}
