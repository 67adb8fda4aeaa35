//! UseCase: 接続の開始・終了
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ConnectionUseCase::open() / reply() / close() メソッド
//!
//! ### なぜこのテストが必要か
//! - 明示的な leave-room なしに接続が切れた場合も、所属していた全 Room の名簿から外れることを保証
//! - 所属 Room はクライアントの申告ではなく Repository への問い合わせで決まることを確認
//! - Room ごとに 1 回だけ退出通知の対象になることを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：複数 Room に参加した接続の切断
//! - エッジケース：どの Room にも参加していない接続の切断
//! - 異常系：Repository の問い合わせ・削除の失敗（ログに残して続行）

use std::sync::Arc;

use crate::domain::{
    ConnectionId, MessagePushError, MessagePusher, PusherChannel, RoomId, RoomRepository,
};

/// 接続の開始・終了のユースケース
pub struct ConnectionUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn RoomRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl ConnectionUseCase {
    /// 新しい ConnectionUseCase を作成
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
        }
    }

    /// 接続を MessagePusher に登録
    pub async fn open(&self, connection_id: ConnectionId, sender: PusherChannel) {
        self.message_pusher
            .register_connection(connection_id, sender)
            .await;
    }

    /// 接続自身にメッセージを返す
    pub async fn reply(
        &self,
        connection_id: &ConnectionId,
        message: &str,
    ) -> Result<(), MessagePushError> {
        self.message_pusher.push_to(connection_id, message).await
    }

    /// 切断した接続を所属していた全 Room から取り除く
    ///
    /// 先に MessagePusher から登録解除するため、以降の退出通知が本人に届くことはない。
    ///
    /// # Returns
    ///
    /// 名簿から実際に取り除かれた Room の ID（Room ごとに 1 回、ID 順）
    pub async fn close(&self, connection_id: &ConnectionId) -> Vec<RoomId> {
        // 1. トランスポート上の登録と購読をすべて解除
        let subscribed = self
            .message_pusher
            .unregister_connection(connection_id)
            .await;
        tracing::debug!(
            "Connection '{}' was subscribed to {} room(s)",
            connection_id,
            subscribed.len()
        );

        // 2. 接続を含む Room を Repository に問い合わせる
        let rooms = match self
            .repository
            .find_rooms_by_connection_id(connection_id)
            .await
        {
            Ok(rooms) => rooms,
            Err(e) => {
                tracing::error!(
                    "Failed to look up rooms of connection '{}' during cleanup: {}",
                    connection_id,
                    e
                );
                return Vec::new();
            }
        };

        // 3. 各 Room の名簿から削除
        let mut affected = Vec::new();
        for room in rooms {
            match self
                .repository
                .delete_participant(&room.id, connection_id)
                .await
            {
                Ok(0) => {}
                Ok(_) => affected.push(room.id),
                Err(e) => tracing::error!(
                    "Failed to remove connection '{}' from room '{}': {}",
                    connection_id,
                    room.id,
                    e
                ),
            }
        }
        affected
    }

    /// 切断した接続の退出を Room の残りの参加者にブロードキャスト
    pub async fn broadcast_user_left(
        &self,
        room_id: &RoomId,
        connection_id: &ConnectionId,
        message: &str,
    ) -> usize {
        self.message_pusher
            .broadcast_to_room(room_id, connection_id, message)
            .await
    }
}
