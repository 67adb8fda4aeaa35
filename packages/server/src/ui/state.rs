//! Shared application state.

use std::sync::Arc;

use crate::usecase::{
    ConnectionUseCase, CreateRoomUseCase, GetRoomDetailUseCase, GetRoomsUseCase, JoinRoomUseCase,
    LeaveRoomUseCase, SyncStateUseCase,
};

/// Shared application state
pub struct AppState {
    /// ConnectionUseCase（接続の開始・終了のユースケース）
    pub connection_usecase: Arc<ConnectionUseCase>,
    /// CreateRoomUseCase（Room 作成のユースケース）
    pub create_room_usecase: Arc<CreateRoomUseCase>,
    /// JoinRoomUseCase（Room 参加のユースケース）
    pub join_room_usecase: Arc<JoinRoomUseCase>,
    /// LeaveRoomUseCase（Room 退出のユースケース）
    pub leave_room_usecase: Arc<LeaveRoomUseCase>,
    /// SyncStateUseCase（状態同期のユースケース）
    pub sync_state_usecase: Arc<SyncStateUseCase>,
    /// GetRoomsUseCase（Room 一覧取得のユースケース）
    pub get_rooms_usecase: Arc<GetRoomsUseCase>,
    /// GetRoomDetailUseCase（Room 詳細取得のユースケース）
    pub get_room_detail_usecase: Arc<GetRoomDetailUseCase>,
}
