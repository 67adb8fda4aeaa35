//! UseCase: Room 作成
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - CreateRoomUseCase::execute() メソッド
//!
//! ### なぜこのテストが必要か
//! - 同じ ID の Room は高々 1 つ、既存の Room は上書きされない
//! - 存在確認の失敗は AlreadyExists / 作成のどちらとも判断できないため、エラーとして返す
//!
//! ### どのような状況を想定しているか
//! - 正常系：新規 Room の作成（Text / Drawing）
//! - 異常系：既存 ID での作成、存在確認の失敗

use std::sync::Arc;

use huddle_shared::time::now_millis;

use crate::domain::{RepositoryError, Room, RoomId, RoomKind, RoomRepository, Timestamp};

use super::error::CreateRoomError;

/// Room 作成のユースケース
pub struct CreateRoomUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn RoomRepository>,
}

impl CreateRoomUseCase {
    /// 新しい CreateRoomUseCase を作成
    pub fn new(repository: Arc<dyn RoomRepository>) -> Self {
        Self { repository }
    }

    /// Room 作成を実行
    ///
    /// 参加者ゼロ、種別ごとの初期状態（Text は空文字列、Drawing は空の操作列）で作成する。
    /// 結果は要求した接続にのみ返し、ブロードキャストはしない。
    ///
    /// # Returns
    ///
    /// * `Ok(Room)` - 作成した Room
    /// * `Err(CreateRoomError::AlreadyExists)` - 同じ ID の Room が存在する
    /// * `Err(CreateRoomError::Storage)` - 存在確認または書き込みに失敗
    pub async fn execute(&self, room_id: RoomId, kind: RoomKind) -> Result<Room, CreateRoomError> {
        // 1. 存在確認
        match self.repository.find_room_by_id(&room_id).await {
            Ok(Some(_)) => {
                return Err(CreateRoomError::AlreadyExists(room_id.into_string()));
            }
            Ok(None) => {}
            Err(e) => return Err(CreateRoomError::Storage(e.to_string())),
        }

        // 2. 作成（確認から作成までの間に他の接続が作成した場合も AlreadyExists になる）
        let room = Room::new(room_id, kind, Timestamp::new(now_millis()));
        self.repository
            .create_room(room)
            .await
            .map_err(|e| match e {
                RepositoryError::AlreadyExists(id) => CreateRoomError::AlreadyExists(id),
                other => CreateRoomError::Storage(other.to_string()),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{MockRoomRepository, RoomState, StateUpdate},
        infrastructure::repository::InMemoryRoomRepository,
    };

    fn room_id(id: &str) -> RoomId {
        RoomId::new(id.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_create_text_room_success() {
        // テスト項目: Text Room が空文字列の状態で作成される
        // given (前提条件):
        let repository = Arc::new(InMemoryRoomRepository::new());
        let usecase = CreateRoomUseCase::new(repository.clone());

        // when (操作):
        let result = usecase.execute(room_id("R1"), RoomKind::Text).await;

        // then (期待する結果):
        let room = result.unwrap();
        assert_eq!(room.state, RoomState::Text(String::new()));
        assert!(room.participants.is_empty());
        assert!(repository.find_room_by_id(&room_id("R1")).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_create_drawing_room_success() {
        // テスト項目: Drawing Room が空の操作列で作成される
        // given (前提条件):
        let repository = Arc::new(InMemoryRoomRepository::new());
        let usecase = CreateRoomUseCase::new(repository);

        // when (操作):
        let room = usecase.execute(room_id("W1"), RoomKind::Drawing).await.unwrap();

        // then (期待する結果):
        assert_eq!(room.state, RoomState::Drawing(Vec::new()));
    }

    #[tokio::test]
    async fn test_create_existing_room_fails_and_keeps_state() {
        // テスト項目: 既存 ID での作成は AlreadyExists になり、元の状態は変わらない
        // given (前提条件):
        let repository = Arc::new(InMemoryRoomRepository::new());
        let usecase = CreateRoomUseCase::new(repository.clone());
        usecase.execute(room_id("R1"), RoomKind::Text).await.unwrap();
        repository
            .update_room_state(&room_id("R1"), StateUpdate::ReplaceText("print(1)".to_string()))
            .await
            .unwrap();

        // when (操作):
        let result = usecase.execute(room_id("R1"), RoomKind::Drawing).await;

        // then (期待する結果):
        assert_eq!(result, Err(CreateRoomError::AlreadyExists("R1".to_string())));
        let room = repository.find_room_by_id(&room_id("R1")).await.unwrap().unwrap();
        assert_eq!(room.kind, RoomKind::Text);
        assert_eq!(room.state, RoomState::Text("print(1)".to_string()));
    }

    #[tokio::test]
    async fn test_create_room_lost_race_reports_already_exists() {
        // テスト項目: 存在確認の後に他の接続が作成していた場合も AlreadyExists になる
        // given (前提条件):
        let mut repository = MockRoomRepository::new();
        repository
            .expect_find_room_by_id()
            .returning(|_| Ok(None));
        repository
            .expect_create_room()
            .returning(|room| Err(RepositoryError::AlreadyExists(room.id.into_string())));
        let usecase = CreateRoomUseCase::new(Arc::new(repository));

        // when (操作):
        let result = usecase.execute(room_id("R1"), RoomKind::Text).await;

        // then (期待する結果):
        assert_eq!(result, Err(CreateRoomError::AlreadyExists("R1".to_string())));
    }

    #[tokio::test]
    async fn test_create_room_existence_check_failure_is_escalated() {
        // テスト項目: 存在確認の失敗は Storage エラーとして返され、作成は行われない
        // given (前提条件):
        let mut repository = MockRoomRepository::new();
        repository
            .expect_find_room_by_id()
            .returning(|_| Err(RepositoryError::Storage("timeout".to_string())));
        repository.expect_create_room().never();
        let usecase = CreateRoomUseCase::new(Arc::new(repository));

        // when (操作):
        let result = usecase.execute(room_id("R1"), RoomKind::Text).await;

        // then (期待する結果):
        assert!(matches!(result, Err(CreateRoomError::Storage(_))));
    }
}
