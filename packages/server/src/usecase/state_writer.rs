//! 状態の永続化キュー
//!
//! 接続ごとに 1 つのタスクが書き込みを受信順に Repository へ適用します。
//! ブロードキャストは書き込みを待たずに完了し、書き込みの失敗はログに残して破棄します
//! （at-most-once、再試行なし）。失敗はどのクライアントにも通知されません。

use std::sync::Arc;

use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
};

use crate::domain::{RoomId, RoomRepository, StateUpdate};

enum WriteJob {
    Apply { room_id: RoomId, update: StateUpdate },
    Flush(oneshot::Sender<()>),
}

/// 1 接続分の永続化キュー
///
/// ドロップすると受付を止め、キューに残った書き込みを適用し終えてからタスクが終了する。
pub struct StateWriter {
    tx: mpsc::UnboundedSender<WriteJob>,
    task: JoinHandle<()>,
}

impl StateWriter {
    /// 書き込みタスクを起動
    pub fn spawn(repository: Arc<dyn RoomRepository>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<WriteJob>();
        let task = tokio::spawn(async move {
            while let Some(job) = rx.recv().await {
                match job {
                    WriteJob::Apply { room_id, update } => {
                        if let Err(e) = repository.update_room_state(&room_id, update).await {
                            tracing::error!(
                                "Failed to persist state of room '{}', update dropped: {}",
                                room_id,
                                e
                            );
                        }
                    }
                    WriteJob::Flush(done) => {
                        let _ = done.send(());
                    }
                }
            }
        });
        Self { tx, task }
    }

    /// 書き込みをキューに積む（待たない）
    pub fn enqueue(&self, room_id: RoomId, update: StateUpdate) {
        if self.tx.send(WriteJob::Apply { room_id, update }).is_err() {
            tracing::error!("State writer is closed, update dropped");
        }
    }

    /// ここまでに積んだ書き込みがすべて適用されるまで待つ
    pub async fn flush(&self) {
        let (done_tx, done_rx) = oneshot::channel();
        if self.tx.send(WriteJob::Flush(done_tx)).is_err() {
            return;
        }
        let _ = done_rx.await;
    }

    /// 受付を止め、残りの書き込みが終わるまで待つ
    pub async fn close(self) {
        let Self { tx, task } = self;
        drop(tx);
        if let Err(e) = task.await {
            tracing::error!("State writer task failed: {}", e);
        }
    }
}
