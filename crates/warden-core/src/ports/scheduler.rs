//! Scheduler port - コールバック実行基盤の抽象化
//!
//! tracker はこの trait 越しにしかスケジューリングを行いません。
//! 実際の実行タイミング（イベントループ、フレーム同期など）は実装側の責務です。
//!
//! # 実装
//! - **ManualScheduler**: 仮想時間（テスト・デモ用）
//! - **TokioScheduler**: tokio の LocalSet 上で動かす

use crate::domain::{Category, HandleId};
use std::time::Duration;

/// スケジューラに渡すコールバック
///
/// repeating では何度も呼ばれるので `FnMut`。
/// シングルスレッド前提なので `Send` は要求しない。
pub type Callback = Box<dyn FnMut() + 'static>;

/// Scheduler は 4 種類のコールバック予約とそのキャンセルを提供
///
/// # 契約
/// - どの操作も失敗しない
/// - schedule の中でコールバックを同期的に呼ばない
/// - 知らない id や別カテゴリの id の cancel は何もしない
pub trait Scheduler {
    fn schedule_delayed(&self, callback: Callback, delay: Duration) -> HandleId;

    fn cancel_delayed(&self, id: HandleId);

    fn schedule_repeating(&self, callback: Callback, interval: Duration) -> HandleId;

    fn cancel_repeating(&self, id: HandleId);

    fn schedule_deferred(&self, callback: Callback) -> HandleId;

    fn cancel_deferred(&self, id: HandleId);

    fn schedule_frame_sync(&self, callback: Callback) -> HandleId;

    fn cancel_frame_sync(&self, id: HandleId);

    /// category で振り分けて予約する（deferred / frame_sync では delay を無視）
    fn schedule(&self, category: Category, callback: Callback, delay: Duration) -> HandleId {
        match category {
            Category::Delayed => self.schedule_delayed(callback, delay),
            Category::Repeating => self.schedule_repeating(callback, delay),
            Category::Deferred => self.schedule_deferred(callback),
            Category::FrameSync => self.schedule_frame_sync(callback),
        }
    }

    fn cancel(&self, category: Category, id: HandleId) {
        match category {
            Category::Delayed => self.cancel_delayed(id),
            Category::Repeating => self.cancel_repeating(id),
            Category::Deferred => self.cancel_deferred(id),
            Category::FrameSync => self.cancel_frame_sync(id),
        }
    }
}
