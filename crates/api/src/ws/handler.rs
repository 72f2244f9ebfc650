use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};

use crate::state::AppState;
use crate::ws::protocol::{ClientMessage, ControlMessage};
use crate::ws::session::DebounceSlot;

/// HTTP handler that upgrades the connection to WebSocket.
///
/// After the upgrade the connection is registered (unbound) with the
/// registry and served by a sender task plus the receive loop below.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Manage a single WebSocket connection after upgrade.
///
/// Splits the socket into a sink (outbound) and stream (inbound), then:
///   1. Registers the connection with the registry.
///   2. Spawns a sender task that forwards messages from the registry channel.
///   3. Reads frames on the current task; each one restarts the session check
///      timer and is dispatched on its own task.
///   4. Cancels the pending check and unregisters on disconnect.
async fn handle_socket(socket: WebSocket, state: AppState) {
    let conn_id = uuid::Uuid::new_v4().to_string();
    tracing::info!(conn_id = %conn_id, "WebSocket connected");

    let mut rx = state.registry.register(conn_id.clone()).await;

    let (mut sink, mut stream) = socket.split();

    // Sender task: forward channel messages to the WebSocket sink.
    let sender_conn_id = conn_id.clone();
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sink.send(msg).await.is_err() {
                tracing::debug!(conn_id = %sender_conn_id, "WebSocket sink closed");
                break;
            }
        }
    });

    let slot = DebounceSlot::default();

    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Text(text)) => on_text(&state, &conn_id, &slot, text.as_str()).await,
            Ok(Message::Close(_)) => break,
            Ok(Message::Pong(_)) => {
                tracing::trace!(conn_id = %conn_id, "Pong received");
            }
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(conn_id = %conn_id, error = %e, "WebSocket receive error");
                break;
            }
        }
    }

    slot.cancel().await;
    state.registry.unregister(&conn_id).await;
    send_task.abort();
    tracing::info!(conn_id = %conn_id, "WebSocket disconnected");
}

async fn on_text(state: &AppState, conn_id: &str, slot: &DebounceSlot, text: &str) {
    let message = match ClientMessage::parse(text) {
        Ok(message) => message,
        Err(e) => {
            tracing::debug!(conn_id, error = %e, "Unparseable frame");
            if let Ok(reply) = ControlMessage::error(e.to_string()).encode() {
                state.registry.send_to(conn_id, reply).await;
            }
            return;
        }
    };

    if let Some(credentials) = message.credentials() {
        state.validator.schedule(conn_id, slot, credentials).await;
    }

    let dispatcher = Arc::clone(&state.dispatcher);
    let conn_id = conn_id.to_string();
    tokio::spawn(async move {
        dispatcher.handle(&conn_id, message).await;
    });
}
