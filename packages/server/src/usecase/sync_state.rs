//! UseCase: 状態同期（code-change / draw-line / clear-canvas / cursor-move）
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SyncStateUseCase::apply_text_change() / apply_draw_update() / clear_canvas() / broadcast_cursor()
//!
//! ### なぜこのテストが必要か
//! - 送信者自身には配信されないことを保証
//! - ブロードキャストの後に永続化され、最後に受信した更新が状態として残ることを保証
//! - カーソル位置は永続化されないことを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：連続した code-change、draw-line と clear-canvas の組み合わせ
//! - エッジケース：送信者が Room の参加者でない場合も配信される

use std::sync::Arc;

use crate::domain::{ConnectionId, DrawUpdate, MessagePusher, RoomId, RoomRepository, StateUpdate};

use super::state_writer::StateWriter;

/// 状態同期のユースケース
pub struct SyncStateUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn RoomRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl SyncStateUseCase {
    /// 新しい SyncStateUseCase を作成
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
        }
    }

    /// 接続ごとの永続化キューを起動
    pub fn open_writer(&self) -> StateWriter {
        StateWriter::spawn(self.repository.clone())
    }

    /// テキスト全体の置き換えを配信して永続化キューに積む
    pub async fn apply_text_change(
        &self,
        writer: &StateWriter,
        sender: &ConnectionId,
        room_id: &RoomId,
        content: String,
        message: &str,
    ) -> usize {
        let update = StateUpdate::ReplaceText(content);
        self.broadcast_then_persist(writer, sender, room_id, update, message).await
    }

    /// 描画操作（追加またはスナップショット）を配信して永続化キューに積む
    pub async fn apply_draw_update(
        &self,
        writer: &StateWriter,
        sender: &ConnectionId,
        room_id: &RoomId,
        update: DrawUpdate,
        message: &str,
    ) -> usize {
        let update = StateUpdate::Draw(update);
        self.broadcast_then_persist(writer, sender, room_id, update, message).await
    }

    /// キャンバスの消去を配信して永続化キューに積む
    pub async fn clear_canvas(
        &self,
        writer: &StateWriter,
        sender: &ConnectionId,
        room_id: &RoomId,
        message: &str,
    ) -> usize {
        let update = StateUpdate::clear_canvas();
        self.broadcast_then_persist(writer, sender, room_id, update, message).await
    }

    /// カーソル位置を配信する（永続化しない）
    pub async fn broadcast_cursor(
        &self,
        sender: &ConnectionId,
        room_id: &RoomId,
        message: &str,
    ) -> usize {
        self.message_pusher
            .broadcast_to_room(room_id, sender, message)
            .await
    }

    async fn broadcast_then_persist(
        &self,
        writer: &StateWriter,
        sender: &ConnectionId,
        room_id: &RoomId,
        update: StateUpdate,
        message: &str,
    ) -> usize {
        let delivered = self
            .message_pusher
            .broadcast_to_room(room_id, sender, message)
            .await;
        writer.enqueue(room_id.clone(), update);
        delivered
    }
}
