//! WebSocket connection handlers.
//!
//! Each connection gets a server-generated id, an outbound pusher task and a
//! state writer. Inbound frames are handled one at a time in arrival order.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use serde_json::Value;
use tokio::sync::mpsc;

use crate::{
    domain::{ConnectionId, Identity, RoomId, RoomKind, presence::resolve_participant_key},
    infrastructure::dto::{
        conversion::{draw_update_from_payload, draw_update_to_payload},
        websocket::{ClientEvent, IdentityDto, ParticipantDto, ServerEvent},
    },
    ui::state::AppState,
    usecase::{CreateRoomError, JoinRoomError, StateWriter},
};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Spawns a task that forwards messages from the rx channel to the WebSocket sender.
///
/// The task ends when the channel closes (the connection was unregistered) or
/// the socket refuses a write.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let connection_id = ConnectionId::generate();
    let (sender, mut receiver) = socket.split();

    // Register the outbound channel before reading anything
    let (tx, rx) = mpsc::unbounded_channel();
    state
        .connection_usecase
        .open(connection_id.clone(), tx)
        .await;
    tracing::info!("Connection '{}' opened", connection_id);

    let mut send_task = pusher_loop(rx, sender);
    let writer = state.sync_state_usecase.open_writer();

    loop {
        tokio::select! {
            msg = receiver.next() => {
                let msg = match msg {
                    Some(Ok(msg)) => msg,
                    Some(Err(e)) => {
                        tracing::warn!("WebSocket error on '{}': {}", connection_id, e);
                        break;
                    }
                    None => break,
                };

                match msg {
                    Message::Text(text) => {
                        handle_text(&state, &connection_id, &writer, text.as_str()).await;
                    }
                    Message::Binary(_) => {
                        tracing::warn!("Binary frame from '{}' ignored", connection_id);
                        let event = ServerEvent::error("Binary frames are not supported");
                        reply(&state, &connection_id, event).await;
                    }
                    Message::Close(_) => {
                        tracing::debug!("Connection '{}' requested close", connection_id);
                        break;
                    }
                    // Ping/pong is handled by the WebSocket protocol
                    _ => {}
                }
            }
            _ = &mut send_task => break,
        }
    }

    // Pending writes land before the roster cleanup
    writer.close().await;

    let affected = state.connection_usecase.close(&connection_id).await;
    for room_id in affected {
        let left = ServerEvent::UserLeft {
            room_id: room_id.as_str().to_string(),
            connection_id: connection_id.as_str().to_string(),
        };
        let delivered = state
            .connection_usecase
            .broadcast_user_left(&room_id, &connection_id, &left.to_json())
            .await;
        tracing::info!(
            "Connection '{}' removed from room '{}' ({} notified)",
            connection_id,
            room_id,
            delivered
        );
    }

    send_task.abort();
    tracing::info!("Connection '{}' closed", connection_id);
}

/// Parse and dispatch one inbound text frame.
async fn handle_text(
    state: &AppState,
    connection_id: &ConnectionId,
    writer: &StateWriter,
    text: &str,
) {
    let event = match serde_json::from_str::<ClientEvent>(text) {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!("Malformed event from '{}': {}", connection_id, e);
            let event = ServerEvent::error(format!("Malformed event: {}", e));
            reply(state, connection_id, event).await;
            return;
        }
    };

    let room_id = match RoomId::new(event.room_id().to_string()) {
        Ok(room_id) => room_id,
        Err(e) => {
            tracing::warn!("Invalid room id from '{}': {}", connection_id, e);
            let event = ServerEvent::error(format!("Invalid room id: {}", e));
            reply(state, connection_id, event).await;
            return;
        }
    };

    match event {
        ClientEvent::CreateRoom { kind, .. } => {
            on_create_room(state, connection_id, room_id, kind).await;
        }
        ClientEvent::JoinRoom { identity, .. } => {
            on_join_room(state, connection_id, room_id, identity).await;
        }
        ClientEvent::LeaveRoom { .. } => {
            on_leave_room(state, connection_id, room_id).await;
        }
        ClientEvent::CodeChange { content, .. } => {
            let message = ServerEvent::CodeChange {
                room_id: room_id.as_str().to_string(),
                content: content.clone(),
            };
            let delivered = state
                .sync_state_usecase
                .apply_text_change(writer, connection_id, &room_id, content, &message.to_json())
                .await;
            tracing::debug!("code-change in '{}' delivered to {}", room_id, delivered);
        }
        ClientEvent::CursorMove {
            position, identity, ..
        } => {
            on_cursor_move(state, connection_id, room_id, position, identity).await;
        }
        ClientEvent::DrawLine {
            operation, snapshot, ..
        } => {
            let Some(update) = draw_update_from_payload(operation, snapshot) else {
                tracing::warn!("draw-line from '{}' without a single payload", connection_id);
                reply(
                    state,
                    connection_id,
                    ServerEvent::error("draw-line requires exactly one of operation or snapshot"),
                )
                .await;
                return;
            };
            let (operation, snapshot) = draw_update_to_payload(update.clone());
            let message = ServerEvent::DrawLine {
                room_id: room_id.as_str().to_string(),
                operation,
                snapshot,
            };
            let delivered = state
                .sync_state_usecase
                .apply_draw_update(writer, connection_id, &room_id, update, &message.to_json())
                .await;
            tracing::debug!("draw-line in '{}' delivered to {}", room_id, delivered);
        }
        ClientEvent::ClearCanvas { .. } => {
            let message = ServerEvent::ClearCanvas {
                room_id: room_id.as_str().to_string(),
            };
            let delivered = state
                .sync_state_usecase
                .clear_canvas(writer, connection_id, &room_id, &message.to_json())
                .await;
            tracing::debug!("clear-canvas in '{}' delivered to {}", room_id, delivered);
        }
    }
}

async fn on_create_room(
    state: &AppState,
    connection_id: &ConnectionId,
    room_id: RoomId,
    kind: RoomKind,
) {
    let room_id_str = room_id.as_str().to_string();
    match state.create_room_usecase.execute(room_id, kind).await {
        Ok(room) => {
            tracing::info!("Room '{}' ({}) created by '{}'", room.id, room.kind, connection_id);
            reply(state, connection_id, ServerEvent::RoomCreated { room_id: room_id_str }).await;
        }
        Err(CreateRoomError::AlreadyExists(room_id)) => {
            tracing::info!("Room '{}' already exists", room_id);
            reply(state, connection_id, ServerEvent::RoomExists { room_id }).await;
        }
        Err(CreateRoomError::Storage(e)) => {
            tracing::error!("Failed to create room '{}': {}", room_id_str, e);
            reply(state, connection_id, ServerEvent::error("Could not create room")).await;
        }
    }
}

async fn on_join_room(
    state: &AppState,
    connection_id: &ConnectionId,
    room_id: RoomId,
    identity: IdentityDto,
) {
    let identity = Identity::from(identity);
    let room_id_str = room_id.as_str().to_string();
    match state
        .join_room_usecase
        .execute(room_id.clone(), connection_id.clone(), identity)
        .await
    {
        Ok(joined) => {
            tracing::info!(
                "'{}' joined room '{}' as '{}'",
                connection_id,
                room_id,
                joined.participant.user_id
            );
            let user = ParticipantDto::from(&joined.participant);
            reply(state, connection_id, ServerEvent::from(joined.room)).await;

            let user_joined = ServerEvent::UserJoined {
                room_id: room_id_str,
                user,
            };
            state
                .join_room_usecase
                .broadcast_user_joined(&room_id, connection_id, &user_joined.to_json())
                .await;
        }
        Err(JoinRoomError::RoomNotFound(room_id)) => {
            tracing::info!("'{}' tried to join missing room '{}'", connection_id, room_id);
            reply(state, connection_id, ServerEvent::RoomNotFound { room_id }).await;
        }
        Err(JoinRoomError::Storage(e)) => {
            tracing::error!("Failed to join room '{}': {}", room_id_str, e);
            reply(state, connection_id, ServerEvent::error("Could not join room")).await;
        }
    }
}

async fn on_leave_room(state: &AppState, connection_id: &ConnectionId, room_id: RoomId) {
    match state
        .leave_room_usecase
        .execute(&room_id, connection_id)
        .await
    {
        Ok(removed) => {
            tracing::info!("'{}' left room '{}' ({} removed)", connection_id, room_id, removed);
            let left = ServerEvent::UserLeft {
                room_id: room_id.as_str().to_string(),
                connection_id: connection_id.as_str().to_string(),
            };
            state
                .leave_room_usecase
                .broadcast_user_left(&room_id, connection_id, &left.to_json())
                .await;
        }
        Err(crate::domain::RepositoryError::RoomNotFound(_)) => {
            tracing::debug!("'{}' left missing room '{}'", connection_id, room_id);
        }
        Err(e) => {
            tracing::error!("Failed to leave room '{}': {}", room_id, e);
        }
    }
}

async fn on_cursor_move(
    state: &AppState,
    connection_id: &ConnectionId,
    room_id: RoomId,
    position: Value,
    identity: IdentityDto,
) {
    let identity = Identity::from(identity);
    let message = ServerEvent::CursorMove {
        room_id: room_id.as_str().to_string(),
        user_id: resolve_participant_key(&identity, connection_id).into_string(),
        display_name: identity.display_name_or_default().into_string(),
        position,
    };
    state
        .sync_state_usecase
        .broadcast_cursor(connection_id, &room_id, &message.to_json())
        .await;
}

/// Send an event back to the connection itself.
async fn reply(state: &AppState, connection_id: &ConnectionId, event: ServerEvent) {
    if let Err(e) = state
        .connection_usecase
        .reply(connection_id, &event.to_json())
        .await
    {
        tracing::warn!("Failed to reply to '{}': {}", connection_id, e);
    }
}
