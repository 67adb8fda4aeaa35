//! Repository trait 定義
//!
//! ドメイン層が必要とする Room Store のインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。
//!
//! ## 整合性
//!
//! Room ドキュメントが競合の単位です。各メソッドは 1 回の呼び出しで
//! read-modify-write を完結させる必要があり、実装はそれを Room ごとに直列化します。
//! 呼び出し側は 1 イベントの処理を超えて `Room` をキャッシュしません。

use async_trait::async_trait;

use super::{
    ConnectionId, Participant, RepositoryError, Room, RoomId, StateUpdate, Timestamp, Upsert,
};

/// Room Repository trait
///
/// UseCase 層はこの trait に依存し、Infrastructure 層の具体的な実装には依存しない。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// Room を取得（存在しなければ `Ok(None)`）
    async fn find_room_by_id(&self, room_id: &RoomId) -> Result<Option<Room>, RepositoryError>;

    /// Room を作成
    ///
    /// 同じ ID の Room が既にあれば `AlreadyExists` を返し、既存の Room には触れない。
    async fn create_room(&self, room: Room) -> Result<Room, RepositoryError>;

    /// 参加者を追加または置き換え、更新後の Room と upsert の結果を返す
    async fn upsert_participant(
        &self,
        room_id: &RoomId,
        participant: Participant,
    ) -> Result<(Room, Upsert), RepositoryError>;

    /// Room の状態を更新
    async fn update_room_state(
        &self,
        room_id: &RoomId,
        update: StateUpdate,
    ) -> Result<(), RepositoryError>;

    /// 指定した接続の参加者を含む Room をすべて取得
    async fn find_rooms_by_connection_id(
        &self,
        connection_id: &ConnectionId,
    ) -> Result<Vec<Room>, RepositoryError>;

    /// 接続 ID が一致する参加者を Room から削除し、削除した数を返す（冪等）
    async fn delete_participant(
        &self,
        room_id: &RoomId,
        connection_id: &ConnectionId,
    ) -> Result<usize, RepositoryError>;

    /// 全 Room を ID 順に取得
    async fn list_rooms(&self) -> Result<Vec<Room>, RepositoryError>;

    /// 参加者がおらず、`cutoff` より前から更新のない Room を削除し、削除した ID を返す
    async fn delete_idle_rooms(&self, cutoff: Timestamp) -> Result<Vec<RoomId>, RepositoryError>;
}
