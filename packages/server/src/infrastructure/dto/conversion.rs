//! Conversion logic between DTOs and domain entities.

use serde_json::Value;

use crate::domain::{DisplayName, DrawUpdate, Identity, Participant, Room, RoomState, UserId};
use crate::infrastructure::dto::{http, websocket as dto};
use huddle_shared::time::timestamp_to_rfc3339;

// ========================================
// DTO → Domain
// ========================================

/// Identity fields are best-effort: an empty or over-long `userId` is treated
/// as absent (the connection id becomes the roster key) and an over-long
/// `displayName` is cut to the maximum length.
impl From<dto::IdentityDto> for Identity {
    fn from(dto: dto::IdentityDto) -> Self {
        let user_id = dto.user_id.and_then(|id| UserId::new(id).ok());
        let display_name = dto.display_name.map(DisplayName::truncated);
        Identity::new(user_id, display_name)
    }
}

/// Build a draw update from the `draw-line` payload.
///
/// Returns `None` unless exactly one of `operation` / `snapshot` is present.
/// An explicit `null` operation is present and is appended as-is.
pub fn draw_update_from_payload(
    operation: Option<Value>,
    snapshot: Option<Vec<Value>>,
) -> Option<DrawUpdate> {
    match (operation, snapshot) {
        (Some(operation), None) => Some(DrawUpdate::Append(operation)),
        (None, Some(snapshot)) => Some(DrawUpdate::ReplaceAll(snapshot)),
        _ => None,
    }
}

// ========================================
// Domain → DTO
// ========================================

impl From<&Participant> for dto::ParticipantDto {
    fn from(model: &Participant) -> Self {
        Self {
            user_id: model.user_id.as_str().to_string(),
            display_name: model.display_name.as_str().to_string(),
            connection_id: model.connection_id.as_str().to_string(),
        }
    }
}

impl From<RoomState> for dto::RoomStateDto {
    fn from(model: RoomState) -> Self {
        match model {
            RoomState::Text(content) => Self::Text(content),
            RoomState::Drawing(operations) => Self::Drawing(operations),
        }
    }
}

/// Split a draw update back into the `draw-line` payload fields.
pub fn draw_update_to_payload(update: DrawUpdate) -> (Option<Value>, Option<Vec<Value>>) {
    match update {
        DrawUpdate::Append(operation) => (Some(operation), None),
        DrawUpdate::ReplaceAll(snapshot) => (None, Some(snapshot)),
    }
}

/// `room-state` event for a freshly joined connection.
impl From<Room> for dto::ServerEvent {
    fn from(room: Room) -> Self {
        dto::ServerEvent::RoomState {
            participants: room.participants.iter().map(Into::into).collect(),
            room_id: room.id.into_string(),
            kind: room.kind,
            state: room.state.into(),
        }
    }
}

impl From<&Room> for http::RoomSummaryDto {
    fn from(room: &Room) -> Self {
        Self {
            id: room.id.as_str().to_string(),
            kind: room.kind,
            participants: room
                .participants
                .iter()
                .map(|p| p.user_id.as_str().to_string())
                .collect(),
            created_at: timestamp_to_rfc3339(room.created_at.value()),
        }
    }
}

impl From<&Room> for http::RoomDetailDto {
    fn from(room: &Room) -> Self {
        Self {
            id: room.id.as_str().to_string(),
            kind: room.kind,
            participants: room
                .participants
                .iter()
                .map(|p| http::ParticipantDetailDto {
                    user_id: p.user_id.as_str().to_string(),
                    display_name: p.display_name.as_str().to_string(),
                    connection_id: p.connection_id.as_str().to_string(),
                    joined_at: timestamp_to_rfc3339(p.joined_at.value()),
                })
                .collect(),
            created_at: timestamp_to_rfc3339(room.created_at.value()),
            updated_at: timestamp_to_rfc3339(room.updated_at.value()),
        }
    }
}
