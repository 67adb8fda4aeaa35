//! UseCase 層
//!
//! プロトコルの各イベントに対応するアプリケーションロジック。
//! Domain 層の trait（RoomRepository, MessagePusher）にのみ依存します。

mod connection;
mod create_room;
mod error;
mod get_room_detail;
mod get_rooms;
mod join_room;
mod leave_room;
mod reap_rooms;
mod state_writer;
mod sync_state;

pub use connection::ConnectionUseCase;
pub use create_room::CreateRoomUseCase;
pub use error::{CreateRoomError, GetRoomDetailError, JoinRoomError};
pub use get_room_detail::GetRoomDetailUseCase;
pub use get_rooms::GetRoomsUseCase;
pub use join_room::{JoinRoomUseCase, JoinedRoom};
pub use leave_room::LeaveRoomUseCase;
pub use reap_rooms::ReapRoomsUseCase;
pub use state_writer::StateWriter;
pub use sync_state::SyncStateUseCase;
