//! プレゼンス（参加者名簿）の純粋なロジック
//!
//! 名簿の照合キーは「userId、無ければ connectionId」。
//! 追加・置き換え・削除はすべてこのモジュールの関数を通して行い、
//! キーの解決方法が場所によって食い違わないようにします。
//!
//! - 追加（upsert）はキーで照合する。同じユーザーが別の接続で入り直した場合も 1 件にまとまり、
//!   最新の connectionId が記録される
//! - 削除は connectionId で照合する。存在しない接続の削除は何もしない（冪等）

use super::{
    entity::Participant,
    value_object::{ConnectionId, Identity, UserId},
};

/// upsert の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Upsert {
    /// 新しく末尾に追加した
    Inserted,
    /// 同じキーの参加者をその位置で置き換えた（`displaced` は置き換え前の接続）
    Replaced { displaced: ConnectionId },
}

impl Upsert {
    /// 置き換えで名簿から外れた接続（新しい参加者と同じ接続なら `None`）
    pub fn displaced_connection(&self, joining: &ConnectionId) -> Option<&ConnectionId> {
        match self {
            Upsert::Replaced { displaced } if displaced != joining => Some(displaced),
            _ => None,
        }
    }
}

/// 名簿の照合キーを決める
pub fn resolve_participant_key(identity: &Identity, connection_id: &ConnectionId) -> UserId {
    identity
        .user_id
        .clone()
        .unwrap_or_else(|| UserId::from(connection_id))
}

/// 同じキーの参加者がいれば置き換え、いなければ末尾に追加する
pub fn upsert_participant(roster: &mut Vec<Participant>, participant: Participant) -> Upsert {
    match roster
        .iter_mut()
        .find(|existing| existing.user_id == participant.user_id)
    {
        Some(existing) => {
            let displaced = std::mem::replace(existing, participant).connection_id;
            Upsert::Replaced { displaced }
        }
        None => {
            roster.push(participant);
            Upsert::Inserted
        }
    }
}

/// connectionId が一致する参加者をすべて取り除き、取り除いた数を返す
pub fn remove_by_connection(roster: &mut Vec<Participant>, connection_id: &ConnectionId) -> usize {
    let before = roster.len();
    roster.retain(|participant| &participant.connection_id != connection_id);
    before - roster.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_object::{DisplayName, Timestamp};

    fn connection(id: &str) -> ConnectionId {
        ConnectionId::new(id.to_string()).unwrap()
    }

    fn identity(user_id: Option<&str>, name: Option<&str>) -> Identity {
        Identity::new(
            user_id.map(|id| UserId::new(id.to_string()).unwrap()),
            name.map(|n| DisplayName::new(n.to_string()).unwrap()),
        )
    }

    fn join(roster: &mut Vec<Participant>, identity: &Identity, connection_id: &str) -> Upsert {
        let participant =
            Participant::from_identity(identity, connection(connection_id), Timestamp::new(0));
        upsert_participant(roster, participant)
    }

    // ========================================
    // resolve_participant_key
    // ========================================

    #[test]
    fn test_resolve_key_uses_user_id_when_present() {
        // テスト項目: userId があればそれがキーになる
        // given (前提条件):
        let identity = identity(Some("alice"), None);

        // when (操作):
        let key = resolve_participant_key(&identity, &connection("c1"));

        // then (期待する結果):
        assert_eq!(key.as_str(), "alice");
    }

    #[test]
    fn test_resolve_key_falls_back_to_connection_id() {
        // テスト項目: userId がなければ connectionId がキーになる
        // given (前提条件):
        let identity = identity(None, Some("Alice"));

        // when (操作):
        let key = resolve_participant_key(&identity, &connection("c1"));

        // then (期待する結果):
        assert_eq!(key.as_str(), "c1");
    }

    #[test]
    fn test_anonymous_identities_on_different_connections_get_different_keys() {
        // テスト項目: userId のない 2 つのタブは別々のキーになる
        // given (前提条件):
        let identity = Identity::anonymous();

        // when (操作):
        let first = resolve_participant_key(&identity, &connection("tab-1"));
        let second = resolve_participant_key(&identity, &connection("tab-2"));

        // then (期待する結果):
        assert_ne!(first, second);
    }

    // ========================================
    // upsert_participant
    // ========================================

    #[test]
    fn test_upsert_appends_new_participants_in_order() {
        // テスト項目: 新しい参加者は参加順に末尾へ追加される
        // given (前提条件):
        let mut roster = Vec::new();

        // when (操作):
        let first = join(&mut roster, &identity(Some("alice"), None), "c1");
        let second = join(&mut roster, &identity(Some("bob"), None), "c2");

        // then (期待する結果):
        assert_eq!(first, Upsert::Inserted);
        assert_eq!(second, Upsert::Inserted);
        let users: Vec<&str> = roster.iter().map(|p| p.user_id.as_str()).collect();
        assert_eq!(users, vec!["alice", "bob"]);
    }

    #[test]
    fn test_upsert_collapses_same_user_on_new_connection() {
        // テスト項目: 同じ userId の別接続は 1 件にまとまり、最新の connectionId が残る
        // given (前提条件):
        let mut roster = Vec::new();
        join(&mut roster, &identity(Some("alice"), Some("Alice")), "c1");
        join(&mut roster, &identity(Some("bob"), None), "c2");

        // when (操作):
        let result = join(&mut roster, &identity(Some("alice"), Some("Alice 2")), "c3");

        // then (期待する結果):
        assert_eq!(
            result,
            Upsert::Replaced {
                displaced: connection("c1")
            }
        );
        assert_eq!(result.displaced_connection(&connection("c3")), Some(&connection("c1")));
        assert_eq!(roster.len(), 2);
        assert_eq!(roster[0].user_id.as_str(), "alice");
        assert_eq!(roster[0].connection_id.as_str(), "c3");
        assert_eq!(roster[0].display_name.as_str(), "Alice 2");
    }

    #[test]
    fn test_upsert_same_anonymous_connection_twice_keeps_one_entry() {
        // テスト項目: userId のない同じ接続が 2 回参加しても 1 件のまま
        // given (前提条件):
        let mut roster = Vec::new();
        join(&mut roster, &Identity::anonymous(), "c1");

        // when (操作):
        let result = join(&mut roster, &Identity::anonymous(), "c1");

        // then (期待する結果):
        assert_eq!(
            result,
            Upsert::Replaced {
                displaced: connection("c1")
            }
        );
        assert_eq!(result.displaced_connection(&connection("c1")), None);
        assert_eq!(roster.len(), 1);
    }

    // ========================================
    // remove_by_connection
    // ========================================

    #[test]
    fn test_remove_by_connection_removes_matching_entries() {
        // テスト項目: connectionId が一致する参加者のみ取り除かれる
        // given (前提条件):
        let mut roster = Vec::new();
        join(&mut roster, &identity(Some("alice"), None), "c1");
        join(&mut roster, &identity(Some("bob"), None), "c2");

        // when (操作):
        let removed = remove_by_connection(&mut roster, &connection("c1"));

        // then (期待する結果):
        assert_eq!(removed, 1);
        assert_eq!(roster.len(), 1);
        assert_eq!(roster[0].user_id.as_str(), "bob");
    }

    #[test]
    fn test_remove_by_connection_is_idempotent() {
        // テスト項目: 同じ接続を 2 回削除しても 2 回目は何もしない
        // given (前提条件):
        let mut roster = Vec::new();
        join(&mut roster, &identity(Some("alice"), None), "c1");

        // when (操作):
        let first = remove_by_connection(&mut roster, &connection("c1"));
        let second = remove_by_connection(&mut roster, &connection("c1"));

        // then (期待する結果):
        assert_eq!(first, 1);
        assert_eq!(second, 0);
        assert!(roster.is_empty());
    }

    #[test]
    fn test_remove_old_connection_after_reconnect_keeps_participant() {
        // テスト項目: 再接続で置き換えられた古い接続の削除では参加者は残る
        // given (前提条件):
        let mut roster = Vec::new();
        join(&mut roster, &identity(Some("alice"), None), "old");
        join(&mut roster, &identity(Some("alice"), None), "new");

        // when (操作):
        let removed = remove_by_connection(&mut roster, &connection("old"));

        // then (期待する結果):
        assert_eq!(removed, 0);
        assert_eq!(roster.len(), 1);
        assert_eq!(roster[0].connection_id.as_str(), "new");
    }
}
