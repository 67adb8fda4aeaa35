//! WebSocket を使った MessagePusher 実装
//!
//! ## 責務
//!
//! - 接続ごとの `UnboundedSender` を管理
//! - Room ごとの購読者（トランスポート上のメンバーシップ）を管理
//! - 接続へのメッセージ送信（push_to, broadcast_to_room）
//!
//! ## 設計ノート
//!
//! WebSocket の生成は UI 層（`ui/handler/websocket.rs`）で行われます。
//! この実装は生成された `UnboundedSender` を受け取り、メッセージ送信に使用します。
//! 送信はチャンネルへの投入のみでブロックしないため、ブロードキャストは
//! イベントの受信と同期して完了します。

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{ConnectionId, MessagePushError, MessagePusher, PusherChannel, RoomId};

/// 接続と購読の表
///
/// 2 つの表は常に同じロックの下で更新する。
#[derive(Default)]
struct Registry {
    /// 接続 ID → 送信チャンネル
    connections: HashMap<ConnectionId, PusherChannel>,
    /// Room ID → 購読中の接続 ID
    rooms: HashMap<RoomId, HashSet<ConnectionId>>,
}

/// WebSocket を使った MessagePusher 実装
///
/// ## 使用例
///
/// ```ignore
/// let pusher = WebSocketMessagePusher::new();
/// pusher.register_connection(connection_id.clone(), tx).await;
/// pusher.subscribe(&room_id, &connection_id).await;
///
/// // 送信者以外に配信
/// pusher.broadcast_to_room(&room_id, &connection_id, "{\"type\":\"clear-canvas\"}").await;
/// ```
#[derive(Default)]
pub struct WebSocketMessagePusher {
    registry: Mutex<Registry>,
}

impl WebSocketMessagePusher {
    /// 新しい WebSocketMessagePusher を作成
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MessagePusher for WebSocketMessagePusher {
    async fn register_connection(&self, connection_id: ConnectionId, sender: PusherChannel) {
        let mut registry = self.registry.lock().await;
        tracing::debug!("Connection '{}' registered to MessagePusher", connection_id);
        registry.connections.insert(connection_id, sender);
    }

    async fn unregister_connection(&self, connection_id: &ConnectionId) -> Vec<RoomId> {
        let mut registry = self.registry.lock().await;
        registry.connections.remove(connection_id);

        let mut left = Vec::new();
        registry.rooms.retain(|room_id, subscribers| {
            if subscribers.remove(connection_id) {
                left.push(room_id.clone());
            }
            !subscribers.is_empty()
        });
        left.sort();

        tracing::debug!(
            "Connection '{}' unregistered from MessagePusher ({} subscriptions dropped)",
            connection_id,
            left.len()
        );
        left
    }

    async fn subscribe(&self, room_id: &RoomId, connection_id: &ConnectionId) {
        let mut registry = self.registry.lock().await;
        registry
            .rooms
            .entry(room_id.clone())
            .or_default()
            .insert(connection_id.clone());
    }

    async fn unsubscribe(&self, room_id: &RoomId, connection_id: &ConnectionId) {
        let mut registry = self.registry.lock().await;
        if let Some(subscribers) = registry.rooms.get_mut(room_id) {
            subscribers.remove(connection_id);
            if subscribers.is_empty() {
                registry.rooms.remove(room_id);
            }
        }
    }

    async fn push_to(
        &self,
        connection_id: &ConnectionId,
        content: &str,
    ) -> Result<(), MessagePushError> {
        let registry = self.registry.lock().await;

        let sender = registry
            .connections
            .get(connection_id)
            .ok_or_else(|| MessagePushError::ConnectionNotFound(connection_id.to_string()))?;
        sender
            .send(content.to_string())
            .map_err(|e| MessagePushError::PushFailed(e.to_string()))?;
        tracing::debug!("Pushed message to connection '{}'", connection_id);
        Ok(())
    }

    async fn broadcast_to_room(
        &self,
        room_id: &RoomId,
        exclude: &ConnectionId,
        content: &str,
    ) -> usize {
        let registry = self.registry.lock().await;
        let Some(subscribers) = registry.rooms.get(room_id) else {
            return 0;
        };

        let mut delivered = 0;
        for target in subscribers.iter().filter(|id| *id != exclude) {
            match registry.connections.get(target) {
                // ブロードキャストでは一部の送信失敗を許容
                Some(sender) => match sender.send(content.to_string()) {
                    Ok(()) => delivered += 1,
                    Err(e) => tracing::warn!(
                        "Failed to push message to connection '{}' in room '{}': {}",
                        target,
                        room_id,
                        e
                    ),
                },
                None => tracing::warn!(
                    "Connection '{}' not found during broadcast to room '{}', skipping",
                    target,
                    room_id
                ),
            }
        }
        tracing::debug!(
            "Broadcasted message to {} connection(s) in room '{}'",
            delivered,
            room_id
        );
        delivered
    }

    async fn subscribers(&self, room_id: &RoomId) -> Vec<ConnectionId> {
        let registry = self.registry.lock().await;
        let mut subscribers: Vec<ConnectionId> = registry
            .rooms
            .get(room_id)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default();
        subscribers.sort();
        subscribers
    }
}
