//! Domain 層
//!
//! Room / Participant などのエンティティ、値オブジェクト、
//! プレゼンス（参加者名簿）の純粋なロジック、および
//! Infrastructure 層が実装するインターフェース（Repository, MessagePusher）を定義します。

pub mod entity;
pub mod error;
pub mod message_pusher;
pub mod presence;
pub mod repository;
pub mod value_object;

pub use entity::{DrawUpdate, Participant, Room, RoomState, StateUpdate};
pub use error::{MessagePushError, RepositoryError, RoomError, ValueObjectError};
pub use message_pusher::{MessagePusher, PusherChannel};
pub use presence::Upsert;
pub use repository::RoomRepository;
pub use value_object::{
    ConnectionId, DisplayName, Identity, RoomId, RoomKind, Timestamp, UserId,
};

#[cfg(test)]
pub use message_pusher::MockMessagePusher;
#[cfg(test)]
pub use repository::MockRoomRepository;
