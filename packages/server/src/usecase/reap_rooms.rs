//! UseCase: 空き Room の回収
//!
//! 既定では Room は無期限に保持されます。TTL を設定した場合のみ、
//! 参加者がおらず TTL 以上更新のない Room を定期的に削除します。
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ReapRoomsUseCase::execute() メソッド
//!
//! ### なぜこのテストが必要か
//! - 参加者のいる Room や最近更新された Room が削除されないことを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：TTL を過ぎた空の Room の削除
//! - エッジケース：参加者のいる古い Room、TTL 内の空の Room

use std::{sync::Arc, time::Duration};

use huddle_shared::time::Clock;

use crate::domain::{RepositoryError, RoomId, RoomRepository, Timestamp};

/// 空き Room 回収のユースケース
pub struct ReapRoomsUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn RoomRepository>,
    /// 現在時刻の取得元
    clock: Arc<dyn Clock>,
    /// 空の Room を保持する期間
    ttl: Duration,
}

impl ReapRoomsUseCase {
    /// 新しい ReapRoomsUseCase を作成
    pub fn new(repository: Arc<dyn RoomRepository>, clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            repository,
            clock,
            ttl,
        }
    }

    /// 回収を 1 回実行し、削除した Room の ID を返す
    pub async fn execute(&self) -> Result<Vec<RoomId>, RepositoryError> {
        let ttl_millis = i64::try_from(self.ttl.as_millis()).unwrap_or(i64::MAX);
        let cutoff = Timestamp::new(self.clock.now_millis().saturating_sub(ttl_millis));
        let reaped = self.repository.delete_idle_rooms(cutoff).await?;
        for room_id in &reaped {
            tracing::info!("Reaped idle room '{}'", room_id);
        }
        Ok(reaped)
    }
}
