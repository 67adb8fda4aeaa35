//! エンティティ
//!
//! - `Room`: 共有状態と参加者名簿を持つ単位
//! - `Participant`: Room における 1 接続分のプレゼンス
//! - `RoomState` / `StateUpdate`: Room 種別ごとの状態とその更新

use serde_json::Value;

use super::{
    error::RoomError,
    presence,
    value_object::{ConnectionId, DisplayName, Identity, RoomId, RoomKind, Timestamp, UserId},
};

/// Room の参加者
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    /// 名簿上のキー（userId、未指定なら connectionId）
    pub user_id: UserId,
    pub display_name: DisplayName,
    /// 切断時のクリーンアップに使う所有者キー
    pub connection_id: ConnectionId,
    pub joined_at: Timestamp,
}

impl Participant {
    pub fn new(
        user_id: UserId,
        display_name: DisplayName,
        connection_id: ConnectionId,
        joined_at: Timestamp,
    ) -> Self {
        Self {
            user_id,
            display_name,
            connection_id,
            joined_at,
        }
    }

    /// クライアントの申告した Identity と接続 ID から参加者を作る
    pub fn from_identity(
        identity: &Identity,
        connection_id: ConnectionId,
        joined_at: Timestamp,
    ) -> Self {
        Self {
            user_id: presence::resolve_participant_key(identity, &connection_id),
            display_name: identity.display_name_or_default(),
            connection_id,
            joined_at,
        }
    }
}

/// ホワイトボードの状態更新
///
/// Undo / Redo はクライアント側の履歴操作で、スナップショット全体の置き換えとして届く。
#[derive(Debug, Clone, PartialEq)]
pub enum DrawUpdate {
    /// 操作を 1 件追記
    Append(Value),
    /// 操作列全体を置き換え（Undo / Redo / クリア）
    ReplaceAll(Vec<Value>),
}

/// Room 状態への更新
#[derive(Debug, Clone, PartialEq)]
pub enum StateUpdate {
    /// テキスト全文の置き換え（last-write-wins）
    ReplaceText(String),
    Draw(DrawUpdate),
}

impl StateUpdate {
    /// キャンバスのクリア
    pub fn clear_canvas() -> Self {
        StateUpdate::Draw(DrawUpdate::ReplaceAll(Vec::new()))
    }

    /// この更新が対象とする Room 種別
    pub fn kind(&self) -> RoomKind {
        match self {
            StateUpdate::ReplaceText(_) => RoomKind::Text,
            StateUpdate::Draw(_) => RoomKind::Drawing,
        }
    }
}

/// Room の共有状態
#[derive(Debug, Clone, PartialEq)]
pub enum RoomState {
    Text(String),
    Drawing(Vec<Value>),
}

impl RoomState {
    /// Room 種別ごとの初期状態
    pub fn initial(kind: RoomKind) -> Self {
        match kind {
            RoomKind::Text => RoomState::Text(String::new()),
            RoomKind::Drawing => RoomState::Drawing(Vec::new()),
        }
    }

    pub fn kind(&self) -> RoomKind {
        match self {
            RoomState::Text(_) => RoomKind::Text,
            RoomState::Drawing(_) => RoomKind::Drawing,
        }
    }

    /// 更新を適用する。種別が一致しない場合は状態を変えずにエラーを返す
    pub fn apply(&mut self, update: StateUpdate) -> Result<(), RoomError> {
        match (self, update) {
            (RoomState::Text(content), StateUpdate::ReplaceText(new_content)) => {
                *content = new_content;
                Ok(())
            }
            (RoomState::Drawing(operations), StateUpdate::Draw(DrawUpdate::Append(operation))) => {
                operations.push(operation);
                Ok(())
            }
            (
                RoomState::Drawing(operations),
                StateUpdate::Draw(DrawUpdate::ReplaceAll(snapshot)),
            ) => {
                *operations = snapshot;
                Ok(())
            }
            (state, update) => Err(RoomError::KindMismatch {
                expected: state.kind(),
                actual: update.kind(),
            }),
        }
    }
}

/// Room エンティティ
#[derive(Debug, Clone, PartialEq)]
pub struct Room {
    pub id: RoomId,
    pub kind: RoomKind,
    /// 参加順の名簿
    pub participants: Vec<Participant>,
    pub state: RoomState,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Room {
    /// 参加者ゼロ、種別ごとの初期状態で Room を作る
    pub fn new(id: RoomId, kind: RoomKind, created_at: Timestamp) -> Self {
        Self {
            id,
            kind,
            participants: Vec::new(),
            state: RoomState::initial(kind),
            created_at,
            updated_at: created_at,
        }
    }

    /// 参加者を追加、または同じキーの参加者を置き換える
    pub fn upsert_participant(
        &mut self,
        participant: Participant,
        now: Timestamp,
    ) -> presence::Upsert {
        let result = presence::upsert_participant(&mut self.participants, participant);
        self.updated_at = now;
        result
    }

    /// 接続 ID が一致する参加者をすべて取り除き、取り除いた数を返す
    pub fn remove_by_connection(&mut self, connection_id: &ConnectionId, now: Timestamp) -> usize {
        let removed = presence::remove_by_connection(&mut self.participants, connection_id);
        if removed > 0 {
            self.updated_at = now;
        }
        removed
    }

    pub fn has_connection(&self, connection_id: &ConnectionId) -> bool {
        self.participants
            .iter()
            .any(|p| &p.connection_id == connection_id)
    }

    pub fn apply_update(&mut self, update: StateUpdate, now: Timestamp) -> Result<(), RoomError> {
        self.state.apply(update)?;
        self.updated_at = now;
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }
}
