//! Signed channel query endpoints.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, Uri};
use serde::{Deserialize, Serialize};

use quasar_realtime::BrokerError;
use quasar_realtime::Namespace;
use quasar_realtime::channel::ChannelName;
use quasar_realtime::namespace::ChannelInfo;

use crate::error::ApiError;
use crate::state::AppState;

use super::authorization;

/// Occupied channels of an application.
#[derive(Debug, Serialize, Deserialize)]
pub struct ChannelsResponse {
    /// Channel name → summary.
    pub channels: BTreeMap<String, ChannelSummary>,
}

/// Per-channel entry in [`ChannelsResponse`].
#[derive(Debug, Serialize, Deserialize)]
pub struct ChannelSummary {
    /// Subscribed sockets.
    pub subscription_count: usize,
}

/// Users present on a presence channel.
#[derive(Debug, Serialize, Deserialize)]
pub struct UsersResponse {
    /// One entry per distinct user.
    pub users: Vec<UserEntry>,
}

/// A present user.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserEntry {
    /// User ID.
    pub id: String,
}

/// GET /apps/{app_key}/channels
pub async fn list_channels(
    State(state): State<AppState>,
    Path(app_key): Path<String>,
    uri: Uri,
    headers: HeaderMap,
) -> Result<Json<ChannelsResponse>, ApiError> {
    let namespace = authenticate(&state, &app_key, &uri, &headers)?;

    let channels = namespace
        .occupied_channels()
        .await
        .into_iter()
        .map(|(name, subscription_count)| (name, ChannelSummary { subscription_count }))
        .collect();

    Ok(Json(ChannelsResponse { channels }))
}

/// GET /apps/{app_key}/channels/{channel}
pub async fn channel_info(
    State(state): State<AppState>,
    Path((app_key, channel)): Path<(String, String)>,
    uri: Uri,
    headers: HeaderMap,
) -> Result<Json<ChannelInfo>, ApiError> {
    let namespace = authenticate(&state, &app_key, &uri, &headers)?;
    let channel = parse_channel(&channel)?;
    Ok(Json(namespace.channel_info(&channel).await))
}

/// GET /apps/{app_key}/channels/{channel}/users
pub async fn channel_users(
    State(state): State<AppState>,
    Path((app_key, channel)): Path<(String, String)>,
    uri: Uri,
    headers: HeaderMap,
) -> Result<Json<UsersResponse>, ApiError> {
    let namespace = authenticate(&state, &app_key, &uri, &headers)?;
    let channel = parse_channel(&channel)?;
    if !channel.is_presence() {
        return Err(BrokerError::Validation(format!("{channel} is not a presence channel")).into());
    }

    let users = namespace
        .presence_members(channel.as_str())
        .await
        .into_iter()
        .map(|member| UserEntry { id: member.id })
        .collect();

    Ok(Json(UsersResponse { users }))
}

fn authenticate(
    state: &AppState,
    app_key: &str,
    uri: &Uri,
    headers: &HeaderMap,
) -> Result<Arc<Namespace>, ApiError> {
    Ok(state.realtime.trigger.authenticate(
        app_key,
        "GET",
        uri.path(),
        "",
        authorization(headers),
    )?)
}

fn parse_channel(raw: &str) -> Result<ChannelName, ApiError> {
    ChannelName::parse(raw)
        .map_err(|_| BrokerError::Validation(format!("Invalid channel name '{raw}'")).into())
}
