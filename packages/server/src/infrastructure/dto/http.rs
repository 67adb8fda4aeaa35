//! HTTP API response DTOs.

use serde::{Deserialize, Serialize};

use crate::domain::RoomKind;

/// Room summary returned by `GET /api/rooms`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummaryDto {
    pub id: String,
    pub kind: RoomKind,
    /// User IDs in roster order
    pub participants: Vec<String>,
    pub created_at: String,
}

/// Participant detail in `RoomDetailDto`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantDetailDto {
    pub user_id: String,
    pub display_name: String,
    pub connection_id: String,
    pub joined_at: String,
}

/// Room detail returned by `GET /api/rooms/{room_id}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomDetailDto {
    pub id: String,
    pub kind: RoomKind,
    pub participants: Vec<ParticipantDetailDto>,
    pub created_at: String,
    pub updated_at: String,
}
