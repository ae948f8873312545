//! Trigger endpoint.

use axum::extract::{Path, State};
use axum::http::{HeaderMap, Method, StatusCode, Uri};

use quasar_realtime::trigger::TriggerRequest;

use crate::error::ApiError;
use crate::state::AppState;

use super::{authorization, content_type};

/// POST /apps/{app_key}/events
///
/// The bearer token must be the HMAC of `"POST\n{path}:{body}"` over the raw
/// body bytes as sent.
pub async fn trigger(
    State(state): State<AppState>,
    Path(app_key): Path<String>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> Result<(StatusCode, &'static str), ApiError> {
    let request = TriggerRequest {
        app_key: &app_key,
        method: method.as_str(),
        path: uri.path(),
        body: &body,
        authorization: authorization(&headers),
        content_type: content_type(&headers),
    };

    state.realtime.trigger.trigger(request).await?;

    Ok((StatusCode::OK, "200 OK"))
}
