//! MessagePusher trait 定義
//!
//! 接続へのメッセージ送信（Transport Fan-out）のインターフェース。
//!
//! トランスポート上の Room 購読（どの接続がどの Room の配信を受け取るか）は
//! Repository の参加者名簿とは別に管理されますが、UseCase 層が名簿の更新と
//! 同時に `subscribe` / `unsubscribe` を呼ぶことで両者を一致させます。

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{ConnectionId, MessagePushError, RoomId};

/// 接続ごとの送信チャンネル（JSON 文字列を送る）
pub type PusherChannel = mpsc::UnboundedSender<String>;

/// MessagePusher trait
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// 接続を登録
    async fn register_connection(&self, connection_id: ConnectionId, sender: PusherChannel);

    /// 接続の登録を解除し、購読していた Room をすべて外す。外した Room を返す
    async fn unregister_connection(&self, connection_id: &ConnectionId) -> Vec<RoomId>;

    /// 接続を Room の配信対象に加える
    async fn subscribe(&self, room_id: &RoomId, connection_id: &ConnectionId);

    /// 接続を Room の配信対象から外す
    async fn unsubscribe(&self, room_id: &RoomId, connection_id: &ConnectionId);

    /// 特定の接続にメッセージを送信
    async fn push_to(
        &self,
        connection_id: &ConnectionId,
        content: &str,
    ) -> Result<(), MessagePushError>;

    /// Room の購読者のうち `exclude` 以外の全員に送信し、送信できた数を返す
    ///
    /// 個々の送信失敗は他の購読者への配信を妨げず、呼び出し側にも伝播しない。
    async fn broadcast_to_room(
        &self,
        room_id: &RoomId,
        exclude: &ConnectionId,
        content: &str,
    ) -> usize;

    /// Room を購読している接続の一覧
    async fn subscribers(&self, room_id: &RoomId) -> Vec<ConnectionId>;
}
