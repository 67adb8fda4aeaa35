//! UseCase 層のエラー型

use thiserror::Error;

/// Room 作成のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CreateRoomError {
    /// 同じ ID の Room が既に存在する（送信者には join-room を使うよう促す）
    #[error("room '{0}' already exists")]
    AlreadyExists(String),

    /// 存在確認または作成の書き込みに失敗した
    #[error("storage failure: {0}")]
    Storage(String),
}

/// Room 参加のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JoinRoomError {
    /// Room が存在しない（送信者には Room の作成を促す）
    #[error("room '{0}' not found")]
    RoomNotFound(String),

    /// 存在確認または名簿の更新に失敗した
    #[error("storage failure: {0}")]
    Storage(String),
}

/// Room 詳細取得のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GetRoomDetailError {
    #[error("invalid room id: {0}")]
    InvalidRoomId(String),

    #[error("room not found")]
    RoomNotFound,

    #[error("repository error: {0}")]
    RepositoryError(String),
}
