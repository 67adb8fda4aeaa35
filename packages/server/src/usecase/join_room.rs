//! UseCase: Room 参加
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - JoinRoomUseCase::execute() メソッド
//! - JoinRoomUseCase::broadcast_user_joined() メソッド
//!
//! ### なぜこのテストが必要か
//! - 参加には事前の作成が必要（存在しない Room への参加は RoomNotFound、自動作成しない）
//! - 同じ userId の再接続が名簿上 1 件にまとまることを保証
//! - 名簿への追加とトランスポート上の購読が同時に行われることを保証
//! - 名簿から置き換えられた古い接続が Room の配信を受け続けないことを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：参加、再接続による置き換え（古い接続の購読解除を含む）
//! - 異常系：存在しない Room、存在確認の失敗、名簿更新の失敗

use std::sync::Arc;

use huddle_shared::time::now_millis;

use crate::domain::{
    ConnectionId, Identity, MessagePusher, Participant, RepositoryError, Room, RoomId,
    RoomRepository, Timestamp,
};

use super::error::JoinRoomError;

/// 参加結果
#[derive(Debug, Clone)]
pub struct JoinedRoom {
    /// 参加後の Room（状態と名簿）
    pub room: Room,
    /// 名簿に記録された参加者
    pub participant: Participant,
}

/// Room 参加のユースケース
pub struct JoinRoomUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn RoomRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl JoinRoomUseCase {
    /// 新しい JoinRoomUseCase を作成
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
        }
    }

    /// Room 参加を実行
    ///
    /// # Arguments
    ///
    /// * `room_id` - 参加する Room
    /// * `connection_id` - 参加する接続
    /// * `identity` - クライアントが申告した身元（ベストエフォート）
    ///
    /// # Returns
    ///
    /// * `Ok(JoinedRoom)` - 参加後の Room と記録された参加者
    /// * `Err(JoinRoomError::RoomNotFound)` - Room が存在しない（副作用なし）
    /// * `Err(JoinRoomError::Storage)` - 存在確認または名簿の更新に失敗
    pub async fn execute(
        &self,
        room_id: RoomId,
        connection_id: ConnectionId,
        identity: Identity,
    ) -> Result<JoinedRoom, JoinRoomError> {
        // 1. 存在確認
        match self.repository.find_room_by_id(&room_id).await {
            Ok(Some(_)) => {}
            Ok(None) => return Err(JoinRoomError::RoomNotFound(room_id.into_string())),
            Err(e) => return Err(JoinRoomError::Storage(e.to_string())),
        }

        // 2. 名簿に upsert
        let participant = Participant::from_identity(
            &identity,
            connection_id.clone(),
            Timestamp::new(now_millis()),
        );
        let (room, upsert) = self
            .repository
            .upsert_participant(&room_id, participant.clone())
            .await
            .map_err(|e| match e {
                RepositoryError::RoomNotFound(id) => JoinRoomError::RoomNotFound(id),
                other => JoinRoomError::Storage(other.to_string()),
            })?;

        // 3. トランスポート上の購読（名簿から外れた接続は購読も外す）
        if let Some(displaced) = upsert.displaced_connection(&connection_id) {
            tracing::info!(
                "Connection '{}' replaced by '{}' in room '{}'",
                displaced,
                connection_id,
                room_id
            );
            self.message_pusher.unsubscribe(&room_id, displaced).await;
        }
        self.message_pusher
            .subscribe(&room_id, &connection_id)
            .await;

        Ok(JoinedRoom { room, participant })
    }

    /// 参加者が join したことを既存の参加者にブロードキャスト
    ///
    /// # Returns
    ///
    /// 配信できた接続の数
    pub async fn broadcast_user_joined(
        &self,
        room_id: &RoomId,
        new_connection_id: &ConnectionId,
        message: &str,
    ) -> usize {
        self.message_pusher
            .broadcast_to_room(room_id, new_connection_id, message)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{MockRoomRepository, RoomKind, UserId},
        infrastructure::{
            message_pusher::WebSocketMessagePusher, repository::InMemoryRoomRepository,
        },
    };
    use tokio::sync::mpsc;

    fn room_id(id: &str) -> RoomId {
        RoomId::new(id.to_string()).unwrap()
    }

    fn connection(id: &str) -> ConnectionId {
        ConnectionId::new(id.to_string()).unwrap()
    }

    fn user(id: &str) -> Identity {
        Identity::new(Some(UserId::new(id.to_string()).unwrap()), None)
    }

    async fn setup() -> (
        Arc<InMemoryRoomRepository>,
        Arc<WebSocketMessagePusher>,
        JoinRoomUseCase,
    ) {
        let repository = Arc::new(InMemoryRoomRepository::new());
        repository
            .create_room(Room::new(room_id("R1"), RoomKind::Text, Timestamp::new(0)))
            .await
            .unwrap();
        let pusher = Arc::new(WebSocketMessagePusher::new());
        let usecase = JoinRoomUseCase::new(repository.clone(), pusher.clone());
        (repository, pusher, usecase)
    }

    #[tokio::test]
    async fn test_join_room_success() {
        // テスト項目: 参加すると名簿に追加され、Room の購読者になる
        // given (前提条件):
        let (_repository, pusher, usecase) = setup().await;

        // when (操作):
        let result = usecase
            .execute(room_id("R1"), connection("c1"), user("alice"))
            .await;

        // then (期待する結果):
        let joined = result.unwrap();
        assert_eq!(joined.room.participants.len(), 1);
        assert_eq!(joined.participant.user_id.as_str(), "alice");
        assert_eq!(joined.participant.display_name.as_str(), "Anonymous");
        assert_eq!(pusher.subscribers(&room_id("R1")).await, vec![connection("c1")]);
    }

    #[tokio::test]
    async fn test_join_missing_room_has_no_side_effects() {
        // テスト項目: 存在しない Room への参加は RoomNotFound で、Room も購読も作られない
        // given (前提条件):
        let (repository, pusher, usecase) = setup().await;

        // when (操作):
        let result = usecase
            .execute(room_id("missing"), connection("c1"), user("alice"))
            .await;

        // then (期待する結果):
        assert!(matches!(result, Err(JoinRoomError::RoomNotFound(id)) if id == "missing"));
        assert!(repository.find_room_by_id(&room_id("missing")).await.unwrap().is_none());
        assert!(pusher.subscribers(&room_id("missing")).await.is_empty());
    }

    #[tokio::test]
    async fn test_rejoin_with_same_user_id_collapses_entry() {
        // テスト項目: 同じ userId が別の接続で参加すると、最新の接続 ID を持つ 1 件になる
        // given (前提条件):
        let (_repository, _pusher, usecase) = setup().await;
        usecase
            .execute(room_id("R1"), connection("c1"), user("alice"))
            .await
            .unwrap();

        // when (操作):
        let joined = usecase
            .execute(room_id("R1"), connection("c2"), user("alice"))
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(joined.room.participants.len(), 1);
        assert_eq!(joined.room.participants[0].connection_id, connection("c2"));
    }

    #[tokio::test]
    async fn test_rejoin_on_new_connection_unsubscribes_old_connection() {
        // テスト項目: 同じ userId が別の接続で入り直すと、古い接続には Room の配信が届かなくなる
        // given (前提条件): alice が tab-1 で参加済み、bob も参加済み
        let (_repository, pusher, usecase) = setup().await;
        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, mut rx2) = mpsc::unbounded_channel();
        let (tx3, _rx3) = mpsc::unbounded_channel();
        pusher.register_connection(connection("tab-1"), tx1).await;
        pusher.register_connection(connection("tab-2"), tx2).await;
        pusher.register_connection(connection("bob"), tx3).await;
        for (conn, identity) in [("tab-1", "alice"), ("bob", "bob")] {
            usecase
                .execute(room_id("R1"), connection(conn), user(identity))
                .await
                .unwrap();
        }

        // when (操作): alice が tab-2 で入り直し、bob が配信する
        usecase
            .execute(room_id("R1"), connection("tab-2"), user("alice"))
            .await
            .unwrap();
        let delivered = pusher
            .broadcast_to_room(&room_id("R1"), &connection("bob"), "Z")
            .await;

        // then (期待する結果):
        assert_eq!(delivered, 1);
        assert_eq!(rx2.recv().await, Some("Z".to_string()));
        assert!(rx1.try_recv().is_err());
        let subscribers = pusher.subscribers(&room_id("R1")).await;
        assert!(!subscribers.contains(&connection("tab-1")));
    }

    #[tokio::test]
    async fn test_rejoin_on_same_connection_stays_subscribed() {
        // テスト項目: 同じ接続で入り直しても購読は維持される
        // given (前提条件):
        let (_repository, pusher, usecase) = setup().await;
        usecase
            .execute(room_id("R1"), connection("c1"), user("alice"))
            .await
            .unwrap();

        // when (操作):
        usecase
            .execute(room_id("R1"), connection("c1"), user("alice"))
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(pusher.subscribers(&room_id("R1")).await, vec![connection("c1")]);
    }

    #[tokio::test]
    async fn test_roster_keeps_join_order() {
        // テスト項目: 名簿は参加順に並ぶ
        // given (前提条件):
        let (_repository, _pusher, usecase) = setup().await;
        usecase
            .execute(room_id("R1"), connection("c1"), user("alice"))
            .await
            .unwrap();

        // when (操作):
        let joined = usecase
            .execute(room_id("R1"), connection("c2"), user("bob"))
            .await
            .unwrap();

        // then (期待する結果):
        let users: Vec<&str> = joined
            .room
            .participants
            .iter()
            .map(|p| p.user_id.as_str())
            .collect();
        assert_eq!(users, vec!["alice", "bob"]);
    }

    #[tokio::test]
    async fn test_broadcast_user_joined_skips_new_participant() {
        // テスト項目: user-joined は新しい参加者以外にのみ届く
        // given (前提条件):
        let (_repository, pusher, usecase) = setup().await;
        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, mut rx2) = mpsc::unbounded_channel();
        pusher.register_connection(connection("c1"), tx1).await;
        pusher.register_connection(connection("c2"), tx2).await;
        usecase
            .execute(room_id("R1"), connection("c1"), user("alice"))
            .await
            .unwrap();
        usecase
            .execute(room_id("R1"), connection("c2"), user("bob"))
            .await
            .unwrap();

        // when (操作):
        let delivered = usecase
            .broadcast_user_joined(&room_id("R1"), &connection("c2"), "joined")
            .await;

        // then (期待する結果):
        assert_eq!(delivered, 1);
        assert_eq!(rx1.recv().await, Some("joined".to_string()));
        assert!(rx2.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_join_existence_check_failure_is_escalated() {
        // テスト項目: 存在確認の失敗は Storage エラーとして返され、名簿は更新されない
        // given (前提条件):
        let mut repository = MockRoomRepository::new();
        repository
            .expect_find_room_by_id()
            .returning(|_| Err(RepositoryError::Storage("connection reset".to_string())));
        repository.expect_upsert_participant().never();
        let pusher = Arc::new(WebSocketMessagePusher::new());
        let usecase = JoinRoomUseCase::new(Arc::new(repository), pusher.clone());

        // when (操作):
        let result = usecase
            .execute(room_id("R1"), connection("c1"), user("alice"))
            .await;

        // then (期待する結果):
        assert!(matches!(result, Err(JoinRoomError::Storage(_))));
        assert!(pusher.subscribers(&room_id("R1")).await.is_empty());
    }
}
