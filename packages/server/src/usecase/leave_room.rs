//! UseCase: Room 退出（明示的な leave-room）
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - LeaveRoomUseCase::execute() メソッド
//!
//! ### なぜこのテストが必要か
//! - 名簿からの削除とトランスポート上の購読解除が同時に行われることを保証
//! - 同じ接続の 2 回目の退出が何もしない（冪等）ことを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：参加中の Room からの退出
//! - エッジケース：2 回目の退出、存在しない Room からの退出

use std::sync::Arc;

use crate::domain::{ConnectionId, MessagePusher, RepositoryError, RoomId, RoomRepository};

/// Room 退出のユースケース
pub struct LeaveRoomUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn RoomRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl LeaveRoomUseCase {
    /// 新しい LeaveRoomUseCase を作成
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
        }
    }

    /// Room 退出を実行
    ///
    /// # Returns
    ///
    /// * `Ok(usize)` - 名簿から削除した参加者の数（0 でも Room は存在する）
    /// * `Err(RepositoryError::RoomNotFound)` - Room が存在しない
    /// * `Err(RepositoryError)` - 名簿の更新に失敗（呼び出し側でログに残して破棄する）
    pub async fn execute(
        &self,
        room_id: &RoomId,
        connection_id: &ConnectionId,
    ) -> Result<usize, RepositoryError> {
        // 1. トランスポート上の購読を解除（名簿の更新に失敗しても配信は止める）
        self.message_pusher
            .unsubscribe(room_id, connection_id)
            .await;

        // 2. 名簿から削除
        self.repository
            .delete_participant(room_id, connection_id)
            .await
    }

    /// 参加者が left したことを残りの参加者にブロードキャスト
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
