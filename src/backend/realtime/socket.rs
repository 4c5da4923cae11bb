/**
 * WebSocket Endpoint
 *
 * `GET /ws?username=<u>&couple_id=<c>[&token=<jwt>]`
 *
 * Each upgraded connection runs two tasks: a reader that feeds inbound
 * frames to the lifecycle manager, and a writer that drains the
 * connection's outbound queue onto the socket. The writer is the only code
 * that touches the socket's sink; the router reaches it solely through the
 * outbound queue.
 *
 * # Identity
 *
 * By default the `username` query parameter is trusted as sent, which keeps
 * existing clients working but lets any caller claim any name. With
 * `WS_REQUIRE_TOKEN` enabled the `token` parameter is verified before the
 * upgrade (401 on failure) and the username comes from the token instead.
 * `couple_id` is taken from the query in both modes.
 *
 * # Termination
 *
 * Whichever task finishes first ends the connection. A failed read, a
 * client close or a malformed payload stops the reader; a failed write or
 * a closed outbound queue stops the writer. Either way `on_disconnect` runs
 * once afterwards. No error frame is sent: clients only observe the close.
 */
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use std::time::Duration;

use crate::backend::error::BackendError;
use crate::backend::realtime::lifecycle::SessionManager;
use crate::backend::realtime::registry::ConnectionHandle;
use crate::backend::server::state::AppState;

/// How long the writer may keep flushing after the reader has stopped
const WRITER_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Query parameters of the upgrade request
#[derive(Debug, Default, Deserialize)]
pub struct SocketParams {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub couple_id: String,
    #[serde(default)]
    pub token: Option<String>,
}

/// Upgrade handler for `GET /ws`
pub async fn handle_socket_upgrade(
    State(state): State<AppState>,
    Query(params): Query<SocketParams>,
    ws: WebSocketUpgrade,
) -> Result<Response, BackendError> {
    let SocketParams {
        username,
        couple_id,
        token,
    } = params;

    let username = if state.config.ws_require_token {
        let token = token
            .filter(|token| !token.is_empty())
            .ok_or_else(|| BackendError::unauthorized("missing token"))?;
        state.identity.verify(&token)?
    } else {
        if !username.is_empty() {
            tracing::warn!(
                "[Realtime] Accepting unverified identity {} for couple {}",
                username,
                couple_id
            );
        }
        username
    };

    let manager = state.sessions.clone();
    let capacity = state.config.outbound_capacity;
    Ok(ws
        .max_message_size(state.config.max_frame_bytes)
        .on_upgrade(move |socket| run_connection(socket, manager, capacity, username, couple_id)))
}

/// Drive one upgraded connection from `Connecting` to `Closed`
pub async fn run_connection(
    socket: WebSocket,
    manager: SessionManager,
    capacity: usize,
    username: String,
    couple_id: String,
) {
    let (handle, mut outbound) = ConnectionHandle::channel(capacity);
    let id = handle.id();
    let (mut sink, mut stream) = socket.split();

    if manager.on_connect(handle, &username, &couple_id).is_err() {
        let _ = sink.close().await;
        return;
    }

    let mut writer = tokio::spawn(async move {
        while let Some(event) = outbound.recv().await {
            let text = match serde_json::to_string(event.as_ref()) {
                Ok(text) => text,
                Err(err) => {
                    tracing::error!("[Realtime] Failed to encode event for {}: {}", id, err);
                    continue;
                }
            };
            if let Err(err) = sink.send(Message::Text(text.into())).await {
                tracing::debug!("[Realtime] Write to {} failed: {}", id, err);
                return;
            }
        }
        let _ = sink.close().await;
    });

    let reader_manager = manager.clone();
    let mut reader = tokio::spawn(async move {
        while let Some(frame) = stream.next().await {
            let result = match frame {
                Ok(Message::Text(text)) => reader_manager.on_inbound_payload(id, text.as_str().as_bytes()),
                Ok(Message::Binary(bytes)) => reader_manager.on_inbound_payload(id, &bytes),
                Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => Ok(()),
                Ok(Message::Close(_)) => break,
                Err(err) => {
                    tracing::debug!("[Realtime] Read from {} failed: {}", id, err);
                    break;
                }
            };
            if let Err(err) = result {
                tracing::debug!("[Realtime] Closing {}: {}", id, err);
                break;
            }
        }
    });

    tokio::select! {
        _ = &mut writer => {
            reader.abort();
            manager.on_disconnect(id);
        }
        _ = &mut reader => {
            // Deregistering drops the last outbound sender, so the writer
            // flushes what is queued and closes the socket.
            manager.on_disconnect(id);
            if tokio::time::timeout(WRITER_DRAIN_TIMEOUT, &mut writer).await.is_err() {
                writer.abort();
            }
        }
    }
}
