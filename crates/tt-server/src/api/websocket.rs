//! WebSocket room subscriptions.
//!
//! A connection starts in no rooms. The client joins and leaves rooms by
//! name; every event emitted to a joined room is forwarded as an
//! `{"event", "args"}` frame.

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::HeaderMap,
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tt_realtime::{Channel, RoomHub};
use uuid::Uuid;

use super::AppState;
use crate::session::Player;

/// Buffer size for per-connection message channels.
const CONNECTION_CHANNEL_BUFFER: usize = 64;

/// Frames sent by clients.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientMessage {
    /// Subscribe to a room.
    Join {
        /// Room name, e.g. `admin` or `portrait7`.
        room: String,
    },
    /// Unsubscribe from a room.
    Leave {
        /// Room name.
        room: String,
    },
}

/// Replies to client frames.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerMessage {
    /// The connection is now in `room`.
    Joined {
        /// The joined room.
        room: Channel,
    },
    /// The connection has left `room`.
    Left {
        /// The room left.
        room: Channel,
    },
    /// A frame was rejected.
    Error {
        /// What went wrong.
        message: String,
    },
}

impl ServerMessage {
    fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }
}

/// Upgrade to a WebSocket. The session is resolved once, from the upgrade
/// request.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Response {
    let player = state.sessions.resolve(&headers).await;
    ws.on_upgrade(move |socket| handle_socket(socket, state, player))
}

async fn handle_socket(socket: WebSocket, state: AppState, player: Option<Player>) {
    let (mut ws_sender, mut ws_receiver) = socket.split();
    let connection_id = Uuid::new_v4();

    let (event_tx, mut event_rx) = mpsc::channel(CONNECTION_CHANNEL_BUFFER);
    let (reply_tx, mut reply_rx) = mpsc::channel::<ServerMessage>(CONNECTION_CHANNEL_BUFFER);
    state.hub.register(connection_id, event_tx).await;

    tracing::info!(
        connection_id = %connection_id,
        player_id = player.map(|p| p.id),
        "WebSocket connection established"
    );

    let send_task = tokio::spawn(async move {
        loop {
            let frame = tokio::select! {
                Some(envelope) = event_rx.recv() => serde_json::to_string(&envelope),
                Some(reply) = reply_rx.recv() => serde_json::to_string(&reply),
                else => break,
            };
            let Ok(json) = frame else { continue };
            if ws_sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(result) = ws_receiver.next().await {
        match result {
            Ok(Message::Text(text)) => {
                let reply = match serde_json::from_str::<ClientMessage>(text.as_str()) {
                    Ok(msg) => handle_message(msg, &state.hub, connection_id, player).await,
                    Err(e) => {
                        tracing::warn!(connection_id = %connection_id, error = %e, "Failed to parse message");
                        ServerMessage::error(format!("invalid message: {e}"))
                    }
                };
                if reply_tx.try_send(reply).is_err() {
                    tracing::warn!(
                        connection_id = %connection_id,
                        "Failed to send reply, channel full or closed"
                    );
                }
            }
            Ok(Message::Close(_)) => {
                tracing::info!(connection_id = %connection_id, "WebSocket closed by client");
                break;
            }
            Err(e) => {
                tracing::error!(connection_id = %connection_id, error = %e, "WebSocket error");
                break;
            }
            _ => {}
        }
    }

    state.hub.unregister(connection_id).await;
    send_task.abort();

    tracing::info!(connection_id = %connection_id, "WebSocket connection terminated");
}

/// Apply one client frame to the hub.
async fn handle_message(
    msg: ClientMessage,
    hub: &RoomHub,
    connection_id: Uuid,
    player: Option<Player>,
) -> ServerMessage {
    match msg {
        ClientMessage::Join { room } => {
            let channel = match room.parse::<Channel>() {
                Ok(channel) => channel,
                Err(e) => return ServerMessage::error(e.to_string()),
            };
            if channel.is_admin() && !player.is_some_and(|p| p.admin) {
                tracing::warn!(connection_id = %connection_id, "Refused admin room to non-admin");
                return ServerMessage::error("the admin room requires an admin session");
            }
            match hub.join(connection_id, channel).await {
                Ok(()) => ServerMessage::Joined { room: channel },
                Err(e) => ServerMessage::error(e.to_string()),
            }
        }
        ClientMessage::Leave { room } => {
            let channel = match room.parse::<Channel>() {
                Ok(channel) => channel,
                Err(e) => return ServerMessage::error(e.to_string()),
            };
            match hub.leave(connection_id, channel).await {
                Ok(()) => ServerMessage::Left { room: channel },
                Err(e) => ServerMessage::error(e.to_string()),
            }
        }
    }
}
