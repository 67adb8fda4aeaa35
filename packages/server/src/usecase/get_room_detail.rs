//! UseCase: Room 詳細取得

use std::sync::Arc;

use crate::domain::{Room, RoomId, RoomRepository};

use super::error::GetRoomDetailError;

/// Room 詳細取得のユースケース
pub struct GetRoomDetailUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn RoomRepository>,
}

impl GetRoomDetailUseCase {
    /// 新しい GetRoomDetailUseCase を作成
    pub fn new(repository: Arc<dyn RoomRepository>) -> Self {
        Self { repository }
    }

    /// Room 詳細を取得
    ///
    /// # Returns
    ///
    /// * `Err(GetRoomDetailError::InvalidRoomId)` - ID の形式が不正
    /// * `Err(GetRoomDetailError::RoomNotFound)` - Room が存在しない
    pub async fn execute(&self, room_id: String) -> Result<Room, GetRoomDetailError> {
        let room_id = RoomId::try_from(room_id)
            .map_err(|e| GetRoomDetailError::InvalidRoomId(e.to_string()))?;

        match self.repository.find_room_by_id(&room_id).await {
            Ok(Some(room)) => Ok(room),
            Ok(None) => Err(GetRoomDetailError::RoomNotFound),
            Err(e) => Err(GetRoomDetailError::RepositoryError(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{MockRoomRepository, RepositoryError, RoomKind, Timestamp},
        infrastructure::repository::InMemoryRoomRepository,
    };

    #[tokio::test]
    async fn test_get_room_detail_success() {
        // テスト項目: 存在する Room の詳細を取得できる
        // given (前提条件):
        let repository = Arc::new(InMemoryRoomRepository::new());
        repository
            .create_room(Room::new(
                RoomId::new("R1".to_string()).unwrap(),
                RoomKind::Drawing,
                Timestamp::new(0),
            ))
            .await
            .unwrap();
        let usecase = GetRoomDetailUseCase::new(repository);

        // when (操作):
        let room = usecase.execute("R1".to_string()).await.unwrap();

        // then (期待する結果):
        assert_eq!(room.id.as_str(), "R1");
        assert_eq!(room.kind, RoomKind::Drawing);
    }

    #[tokio::test]
    async fn test_get_room_detail_not_found() {
        // テスト項目: 存在しない Room は RoomNotFound
        // given (前提条件):
        let usecase = GetRoomDetailUseCase::new(Arc::new(InMemoryRoomRepository::new()));

        // when (操作):
        let result = usecase.execute("missing".to_string()).await;

        // then (期待する結果):
        assert_eq!(result.unwrap_err(), GetRoomDetailError::RoomNotFound);
    }

    #[tokio::test]
    async fn test_get_room_detail_invalid_id() {
        // テスト項目: 空の ID は InvalidRoomId で、Repository に問い合わせない
        // given (前提条件):
        let mut repository = MockRoomRepository::new();
        repository.expect_find_room_by_id().never();
        let usecase = GetRoomDetailUseCase::new(Arc::new(repository));

        // when (操作):
        let result = usecase.execute(String::new()).await;

        // then (期待する結果):
        assert!(matches!(result, Err(GetRoomDetailError::InvalidRoomId(_))));
    }

    #[tokio::test]
    async fn test_get_room_detail_storage_failure() {
        // テスト項目: Repository の失敗は RepositoryError
        // given (前提条件):
        let mut repository = MockRoomRepository::new();
        repository
            .expect_find_room_by_id()
            .returning(|_| Err(RepositoryError::Storage("down".to_string())));
        let usecase = GetRoomDetailUseCase::new(Arc::new(repository));

        // when (操作):
        let result = usecase.execute("R1".to_string()).await;

        // then (期待する結果):
        assert!(matches!(result, Err(GetRoomDetailError::RepositoryError(_))));
    }
}
