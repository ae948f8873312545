//! WebSocket upgrade handler.

use std::time::Duration;

use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Path, State, WebSocketUpgrade};
use axum::response::{IntoResponse, Response};
use futures::{SinkExt, StreamExt};
use tracing::{debug, error, warn};

use quasar_realtime::BrokerError;
use quasar_realtime::connection::Connection;
use quasar_realtime::connection::heartbeat::run_heartbeat;

use crate::error::ApiError;
use crate::state::AppState;

/// How long queued frames may take to flush after the socket closes.
const WRITER_DRAIN: Duration = Duration::from_secs(5);

/// GET /app/{app_key}: WebSocket upgrade bound to one application.
///
/// Unknown keys are refused before the upgrade.
pub async fn ws_upgrade(
    State(state): State<AppState>,
    Path(app_key): Path<String>,
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Result<Response, ApiError> {
    if state.realtime.registry.get(&app_key).is_none() {
        return Err(BrokerError::UnknownApplication(app_key).into());
    }

    let ws = match ws {
        Ok(ws) => ws,
        Err(rejection) => return Ok(rejection.into_response()),
    };

    Ok(ws.on_upgrade(move |socket| handle_socket(state, app_key, socket)))
}

/// Drives one established socket until either side closes it.
async fn handle_socket(state: AppState, app_key: String, socket: WebSocket) {
    let connections = state.realtime.connections.clone();
    let Connection {
        handle,
        mut outbound,
    } = match connections.accept(&app_key).await {
        Ok(conn) => conn,
        Err(e) => {
            warn!(app_key = %app_key, error = %e, "Rejecting socket");
            return;
        }
    };

    let socket_id = handle.id;
    let cancel = handle.cancellation();
    let shutdown = state.realtime.shutdown_token();
    let (mut ws_tx, mut ws_rx) = socket.split();

    let heartbeat = tokio::spawn(run_heartbeat(handle.clone(), connections.heartbeat_config()));

    let writer_cancel = cancel.clone();
    let mut writer = tokio::spawn(async move {
        loop {
            tokio::select! {
                biased;
                frame = outbound.recv() => match frame {
                    Some(frame) => {
                        if ws_tx.send(Message::Text(frame.into())).await.is_err() {
                            break;
                        }
                    }
                    None => break,
                },
                _ = writer_cancel.cancelled() => {
                    let _ = ws_tx.send(Message::Close(None)).await;
                    break;
                }
            }
        }
    });

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = shutdown.cancelled() => break,
            msg = ws_rx.next() => match msg {
                Some(Ok(Message::Text(text))) => {
                    connections.handle_inbound(&socket_id, text.as_str()).await;
                }
                Some(Ok(Message::Ping(_) | Message::Pong(_) | Message::Binary(_))) => {
                    handle.touch().await;
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Err(e)) => {
                    debug!(socket_id = %socket_id, error = %e, "WebSocket error");
                    break;
                }
            }
        }
    }

    handle.close();
    connections.disconnect(&socket_id).await;
    if tokio::time::timeout(WRITER_DRAIN, &mut writer).await.is_err() {
        writer.abort();
    }
    if let Err(e) = heartbeat.await {
        if e.is_panic() {
            error!(socket_id = %socket_id, error = %e, "Heartbeat task panicked");
        }
    }
}
