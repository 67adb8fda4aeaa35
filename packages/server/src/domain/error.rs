//! Domain 層のエラー型

use thiserror::Error;

use super::value_object::RoomKind;

/// 値オブジェクトの生成時に発生するエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("room id must not be empty")]
    RoomIdEmpty,

    #[error("room id is too long (max {max}, got {actual})")]
    RoomIdTooLong { max: usize, actual: usize },

    #[error("room id must not contain control characters")]
    RoomIdInvalidCharacter,

    #[error("user id must not be empty")]
    UserIdEmpty,

    #[error("user id is too long (max {max}, got {actual})")]
    UserIdTooLong { max: usize, actual: usize },

    #[error("display name is too long (max {max}, got {actual})")]
    DisplayNameTooLong { max: usize, actual: usize },

    #[error("connection id must not be empty")]
    ConnectionIdEmpty,
}

/// Room エンティティの不変条件違反
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoomError {
    /// Room の種別と異なる形の状態更新が適用されようとした
    #[error("state update for a {actual} room cannot be applied to a {expected} room")]
    KindMismatch { expected: RoomKind, actual: RoomKind },
}

/// Repository（Room Store）操作のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("room '{0}' not found")]
    RoomNotFound(String),

    #[error("room '{0}' already exists")]
    AlreadyExists(String),

    #[error(transparent)]
    Room(#[from] RoomError),

    /// ストレージ自体の障害（接続断、書き込み失敗など）
    #[error("storage failure: {0}")]
    Storage(String),
}

/// MessagePusher（メッセージ通知）のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    #[error("connection '{0}' not found")]
    ConnectionNotFound(String),

    #[error("failed to push message: {0}")]
    PushFailed(String),
}
