//! UseCase: Room 一覧取得

use std::sync::Arc;

use crate::domain::{RepositoryError, Room, RoomRepository};

/// Room 一覧取得のユースケース
pub struct GetRoomsUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn RoomRepository>,
}

impl GetRoomsUseCase {
    /// 新しい GetRoomsUseCase を作成
    pub fn new(repository: Arc<dyn RoomRepository>) -> Self {
        Self { repository }
    }

    /// 全 Room を ID 順に取得
    pub async fn execute(&self) -> Result<Vec<Room>, RepositoryError> {
        self.repository.list_rooms().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{MockRoomRepository, RoomId, RoomKind, Timestamp},
        infrastructure::repository::InMemoryRoomRepository,
    };

    #[tokio::test]
    async fn test_get_rooms_sorted_by_id() {
        // テスト項目: Room が ID 順に返される
        // given (前提条件):
        let repository = Arc::new(InMemoryRoomRepository::new());
        for id in ["beta", "alpha"] {
            repository
                .create_room(Room::new(
                    RoomId::new(id.to_string()).unwrap(),
                    RoomKind::Text,
                    Timestamp::new(0),
                ))
                .await
                .unwrap();
        }
        let usecase = GetRoomsUseCase::new(repository);

        // when (操作):
        let rooms = usecase.execute().await.unwrap();

        // then (期待する結果):
        let ids: Vec<&str> = rooms.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["alpha", "beta"]);
    }

    #[tokio::test]
    async fn test_get_rooms_propagates_storage_error() {
        // テスト項目: Repository のエラーはそのまま返される
        // given (前提条件):
        let mut repository = MockRoomRepository::new();
        repository
            .expect_list_rooms()
            .returning(|| Err(RepositoryError::Storage("down".to_string())));
        let usecase = GetRoomsUseCase::new(Arc::new(repository));

        // when (操作):
        let result = usecase.execute().await;

        // then (期待する結果):
        assert_eq!(result, Err(RepositoryError::Storage("down".to_string())));
    }
}
