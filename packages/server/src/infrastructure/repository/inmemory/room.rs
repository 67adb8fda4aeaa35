//! InMemory Room Repository 実装
//!
//! ドメイン層が定義する RoomRepository trait の具体的な実装。
//! HashMap をインメモリ DB として使用します。
//!
//! ## 直列化
//!
//! Room テーブル全体を 1 つの `Mutex` で保護し、各メソッドを 1 つのクリティカルセクションで
//! 完結させます。これにより同じ Room への read-modify-write が直列化され、
//! 同時参加による名簿の更新が失われることはありません。

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use huddle_shared::time::{Clock, SystemClock};
use tokio::sync::Mutex;

use crate::domain::{
    ConnectionId, Participant, RepositoryError, Room, RoomId, RoomRepository, StateUpdate,
    Timestamp, Upsert,
};

/// インメモリ Room Repository 実装
pub struct InMemoryRoomRepository {
    /// Room ID → Room
    rooms: Mutex<HashMap<RoomId, Room>>,
    /// updated_at の打刻に使う時計
    clock: Arc<dyn Clock>,
}

impl InMemoryRoomRepository {
    /// システム時計を使う InMemoryRoomRepository を作成
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// 時計を指定して InMemoryRoomRepository を作成
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            rooms: Mutex::new(HashMap::new()),
            clock,
        }
    }

    fn now(&self) -> Timestamp {
        Timestamp::new(self.clock.now_millis())
    }
}

impl Default for InMemoryRoomRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RoomRepository for InMemoryRoomRepository {
    async fn find_room_by_id(&self, room_id: &RoomId) -> Result<Option<Room>, RepositoryError> {
        let rooms = self.rooms.lock().await;
        Ok(rooms.get(room_id).cloned())
    }

    async fn create_room(&self, room: Room) -> Result<Room, RepositoryError> {
        let mut rooms = self.rooms.lock().await;
        if rooms.contains_key(&room.id) {
            return Err(RepositoryError::AlreadyExists(room.id.into_string()));
        }
        rooms.insert(room.id.clone(), room.clone());
        Ok(room)
    }

    async fn upsert_participant(
        &self,
        room_id: &RoomId,
        participant: Participant,
    ) -> Result<(Room, Upsert), RepositoryError> {
        let now = self.now();
        let mut rooms = self.rooms.lock().await;
        let room = rooms
            .get_mut(room_id)
            .ok_or_else(|| RepositoryError::RoomNotFound(room_id.as_str().to_string()))?;
        let upsert = room.upsert_participant(participant, now);
        Ok((room.clone(), upsert))
    }

    async fn update_room_state(
        &self,
        room_id: &RoomId,
        update: StateUpdate,
    ) -> Result<(), RepositoryError> {
        let now = self.now();
        let mut rooms = self.rooms.lock().await;
        let room = rooms
            .get_mut(room_id)
            .ok_or_else(|| RepositoryError::RoomNotFound(room_id.as_str().to_string()))?;
        room.apply_update(update, now)?;
        Ok(())
    }

    async fn find_rooms_by_connection_id(
        &self,
        connection_id: &ConnectionId,
    ) -> Result<Vec<Room>, RepositoryError> {
        let rooms = self.rooms.lock().await;
        let mut found: Vec<Room> = rooms
            .values()
            .filter(|room| room.has_connection(connection_id))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(found)
    }

    async fn delete_participant(
        &self,
        room_id: &RoomId,
        connection_id: &ConnectionId,
    ) -> Result<usize, RepositoryError> {
        let now = self.now();
        let mut rooms = self.rooms.lock().await;
        let room = rooms
            .get_mut(room_id)
            .ok_or_else(|| RepositoryError::RoomNotFound(room_id.as_str().to_string()))?;
        Ok(room.remove_by_connection(connection_id, now))
    }

    async fn list_rooms(&self) -> Result<Vec<Room>, RepositoryError> {
        let rooms = self.rooms.lock().await;
        let mut all: Vec<Room> = rooms.values().cloned().collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(all)
    }

    async fn delete_idle_rooms(&self, cutoff: Timestamp) -> Result<Vec<RoomId>, RepositoryError> {
        let mut rooms = self.rooms.lock().await;
        let mut idle: Vec<RoomId> = rooms
            .values()
            .filter(|room| room.is_empty() && room.updated_at < cutoff)
            .map(|room| room.id.clone())
            .collect();
        idle.sort();
        for room_id in &idle {
            rooms.remove(room_id);
        }
        Ok(idle)
    }
}
