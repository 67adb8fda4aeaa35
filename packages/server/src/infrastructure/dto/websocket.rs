//! WebSocket message DTOs.
//!
//! Every frame is a JSON object tagged by `"type"` with the kebab-case event
//! name; payload fields are camelCase.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::domain::RoomKind;

/// A field that is present maps to `Some`, even when its value is `null`.
///
/// Paired with `#[serde(default)]` so only an absent field becomes `None`.
fn present_value<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Identity a client claims when joining or moving its cursor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(
        default,
        alias = "username",
        alias = "name",
        skip_serializing_if = "Option::is_none"
    )]
    pub display_name: Option<String>,
}

/// Events sent by clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ClientEvent {
    CreateRoom {
        room_id: String,
        kind: RoomKind,
    },
    JoinRoom {
        room_id: String,
        #[serde(default)]
        identity: IdentityDto,
    },
    LeaveRoom {
        room_id: String,
    },
    CodeChange {
        room_id: String,
        content: String,
    },
    CursorMove {
        room_id: String,
        #[serde(default)]
        position: Value,
        #[serde(default)]
        identity: IdentityDto,
    },
    /// Either `operation` (append) or `snapshot` (replace all) must be set.
    DrawLine {
        room_id: String,
        #[serde(
            default,
            deserialize_with = "present_value",
            skip_serializing_if = "Option::is_none"
        )]
        operation: Option<Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        snapshot: Option<Vec<Value>>,
    },
    ClearCanvas {
        room_id: String,
    },
}

impl ClientEvent {
    /// The room this event targets.
    pub fn room_id(&self) -> &str {
        match self {
            ClientEvent::CreateRoom { room_id, .. }
            | ClientEvent::JoinRoom { room_id, .. }
            | ClientEvent::LeaveRoom { room_id }
            | ClientEvent::CodeChange { room_id, .. }
            | ClientEvent::CursorMove { room_id, .. }
            | ClientEvent::DrawLine { room_id, .. }
            | ClientEvent::ClearCanvas { room_id } => room_id,
        }
    }
}

/// A roster entry as seen by clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantDto {
    pub user_id: String,
    pub display_name: String,
    pub connection_id: String,
}

/// Room state on the wire: a string for text rooms, an array for drawing rooms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RoomStateDto {
    Text(String),
    Drawing(Vec<Value>),
}

/// Events sent by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ServerEvent {
    RoomCreated {
        room_id: String,
    },
    RoomExists {
        room_id: String,
    },
    RoomNotFound {
        room_id: String,
    },
    RoomState {
        room_id: String,
        kind: RoomKind,
        state: RoomStateDto,
        participants: Vec<ParticipantDto>,
    },
    UserJoined {
        room_id: String,
        user: ParticipantDto,
    },
    UserLeft {
        room_id: String,
        connection_id: String,
    },
    CodeChange {
        room_id: String,
        content: String,
    },
    CursorMove {
        room_id: String,
        user_id: String,
        display_name: String,
        position: Value,
    },
    DrawLine {
        room_id: String,
        #[serde(
            default,
            deserialize_with = "present_value",
            skip_serializing_if = "Option::is_none"
        )]
        operation: Option<Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        snapshot: Option<Vec<Value>>,
    },
    ClearCanvas {
        room_id: String,
    },
    Error {
        message: String,
    },
}

impl ServerEvent {
    pub fn error(message: impl Into<String>) -> Self {
        ServerEvent::Error {
            message: message.into(),
        }
    }

    /// Serialize to a JSON text frame.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            tracing::error!("Failed to serialize server event: {}", e);
            r#"{"type":"error","message":"internal serialization error"}"#.to_string()
        })
    }
}
