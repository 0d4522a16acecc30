//! TokioScheduler - tokio の LocalSet 上で動くスケジューラ
//!
//! # 学習ポイント
//! - `spawn_local` で `!Send` なコールバックを扱う
//! - `JoinHandle::abort` によるキャンセル
//! - one-shot タスクは実行前に自分を登録表から外す
//!
//! # Panics
//! schedule 系は `LocalSet` のコンテキスト外で呼ぶと tokio が panic します。

use std::cell::RefCell;
use std::collections::HashMap;
use std::future::Future;
use std::rc::{Rc, Weak};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::trace;

use crate::config::SchedulerConfig;
use crate::domain::{Category, HandleId, HandleIdAllocator};
use crate::ports::{Callback, Scheduler};

type TaskTable = RefCell<HashMap<HandleId, (Category, JoinHandle<()>)>>;

/// TokioScheduler は各コールバックを local task として実行する
///
/// # 実装詳細
/// - delayed: `sleep(delay)` 後に 1 回
/// - repeating: `interval_at(now + period, period)`（`MissedTickBehavior::Delay`）
/// - deferred: `yield_now()` 後に 1 回
/// - frame_sync: `sleep(frame_interval)` 後に 1 回
///
/// # 使用例
/// ```ignore
/// let local = LocalSet::new();
/// local.run_until(async {
///     let scheduler = Rc::new(TokioScheduler::new(&SchedulerConfig::default()));
///     scheduler.schedule_delayed(Box::new(|| println!("hi")), Duration::from_millis(10));
///     tokio::time::sleep(Duration::from_millis(20)).await;
/// }).await;
/// ```
pub struct TokioScheduler {
    ids: HandleIdAllocator,
    frame_interval: Duration,
    min_interval: Duration,
    tasks: Rc<TaskTable>,
}

impl TokioScheduler {
    pub fn new(config: &SchedulerConfig) -> Self {
        Self {
            ids: HandleIdAllocator::new(),
            frame_interval: config.frame_interval(),
            min_interval: config.min_interval(),
            tasks: Rc::new(RefCell::new(HashMap::new())),
        }
    }

    /// まだ終わっていない（キャンセルもされていない）タスク数
    pub fn pending(&self, category: Category) -> usize {
        self.tasks
            .borrow()
            .values()
            .filter(|(c, _)| *c == category)
            .count()
    }

    fn spawn<F>(&self, category: Category, id: HandleId, future: F)
    where
        F: Future<Output = ()> + 'static,
    {
        let handle = tokio::task::spawn_local(future);
        self.tasks.borrow_mut().insert(id, (category, handle));
    }

    /// one-shot: `wait` の後に登録表から外してから実行
    fn spawn_once<W>(&self, category: Category, mut callback: Callback, wait: W) -> HandleId
    where
        W: Future<Output = ()> + 'static,
    {
        let id = self.ids.next_id();
        let tasks: Weak<TaskTable> = Rc::downgrade(&self.tasks);
        self.spawn(category, id, async move {
            wait.await;
            if let Some(tasks) = tasks.upgrade() {
                tasks.borrow_mut().remove(&id);
            }
            trace!(%category, handle = %id, "firing local task");
            callback();
        });
        id
    }

    fn abort(&self, category: Category, id: HandleId) {
        let removed = {
            let mut tasks = self.tasks.borrow_mut();
            match tasks.get(&id) {
                Some((c, _)) if *c == category => tasks.remove(&id),
                _ => None,
            }
        };
        if let Some((_, handle)) = removed {
            handle.abort();
        }
    }
}

impl Drop for TokioScheduler {
    /// 残っている local task を止める（JoinHandle の drop だけでは止まらない）
    fn drop(&mut self) {
        for (_, (_, handle)) in self.tasks.borrow_mut().drain() {
            handle.abort();
        }
    }
}

impl Scheduler for TokioScheduler {
    fn schedule_delayed(&self, callback: Callback, delay: Duration) -> HandleId {
        self.spawn_once(Category::Delayed, callback, tokio::time::sleep(delay))
    }

    fn cancel_delayed(&self, id: HandleId) {
        self.abort(Category::Delayed, id);
    }

    fn schedule_repeating(&self, mut callback: Callback, interval: Duration) -> HandleId {
        let id = self.ids.next_id();
        let period = interval.max(self.min_interval);
        let start = Instant::now() + period;
        self.spawn(Category::Repeating, id, async move {
            let mut ticker = tokio::time::interval_at(start, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                trace!(handle = %id, "firing local interval");
                callback();
            }
        });
        id
    }

    fn cancel_repeating(&self, id: HandleId) {
        self.abort(Category::Repeating, id);
    }

    fn schedule_deferred(&self, callback: Callback) -> HandleId {
        self.spawn_once(Category::Deferred, callback, tokio::task::yield_now())
    }

    fn cancel_deferred(&self, id: HandleId) {
        self.abort(Category::Deferred, id);
    }

    fn schedule_frame_sync(&self, callback: Callback) -> HandleId {
        self.spawn_once(
            Category::FrameSync,
            callback,
            tokio::time::sleep(self.frame_interval),
        )
    }

    fn cancel_frame_sync(&self, id: HandleId) {
        self.abort(Category::FrameSync, id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::TimerTracker;
    use std::cell::Cell;
    use tokio::task::LocalSet;
    use tokio::time::sleep;

    fn counting(count: &Rc<Cell<u32>>) -> Callback {
        let count = count.clone();
        Box::new(move || count.set(count.get() + 1))
    }

    #[tokio::test(start_paused = true)]
    async fn delayed_fires_after_delay() {
        let local = LocalSet::new();
        local
            .run_until(async {
                let scheduler = TokioScheduler::new(&SchedulerConfig::default());
                let count = Rc::new(Cell::new(0));
                scheduler.schedule_delayed(counting(&count), Duration::from_millis(100));

                sleep(Duration::from_millis(50)).await;
                assert_eq!(count.get(), 0);
                assert_eq!(scheduler.pending(Category::Delayed), 1);

                sleep(Duration::from_millis(100)).await;
                assert_eq!(count.get(), 1);
                assert_eq!(scheduler.pending(Category::Delayed), 0);
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_delayed_never_fires() {
        let local = LocalSet::new();
        local
            .run_until(async {
                let scheduler = Rc::new(TokioScheduler::new(&SchedulerConfig::default()));
                let tracker = TimerTracker::new(scheduler.clone());
                let count = Rc::new(Cell::new(0));
                let inner = count.clone();

                let id = tracker.schedule(
                    Category::Delayed,
                    move || inner.set(inner.get() + 1),
                    Duration::from_millis(1000),
                );
                tracker.cancel(Category::Delayed, id);

                sleep(Duration::from_millis(2000)).await;
                assert_eq!(count.get(), 0);
                assert_eq!(tracker.len(Category::Delayed), 0);
                assert_eq!(scheduler.pending(Category::Delayed), 0);
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn repeating_fires_until_released() {
        let local = LocalSet::new();
        local
            .run_until(async {
                let scheduler = Rc::new(TokioScheduler::new(&SchedulerConfig::default()));
                let tracker = TimerTracker::new(scheduler.clone());
                let count = Rc::new(Cell::new(0));
                let inner = count.clone();

                let id = tracker.schedule(
                    Category::Repeating,
                    move || inner.set(inner.get() + 1),
                    Duration::from_millis(10),
                );

                sleep(Duration::from_millis(35)).await;
                assert_eq!(count.get(), 3);
                assert_eq!(tracker.outstanding(Category::Repeating), vec![id]);

                tracker.release_all();
                sleep(Duration::from_millis(100)).await;
                assert_eq!(count.get(), 3);
                assert_eq!(scheduler.pending(Category::Repeating), 0);
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn deferred_and_frame_callbacks_remove_themselves() {
        let local = LocalSet::new();
        local
            .run_until(async {
                let scheduler = Rc::new(TokioScheduler::new(&SchedulerConfig::default()));
                let tracker = TimerTracker::new(scheduler.clone());
                let count = Rc::new(Cell::new(0));

                let inner = count.clone();
                tracker.schedule(Category::Deferred, move || inner.set(inner.get() + 1), Duration::ZERO);
                let inner = count.clone();
                tracker.schedule(Category::FrameSync, move || inner.set(inner.get() + 1), Duration::ZERO);

                sleep(Duration::from_millis(50)).await;
                assert_eq!(count.get(), 2);
                assert_eq!(tracker.len(Category::Deferred), 0);
                assert_eq!(tracker.len(Category::FrameSync), 0);
                assert_eq!(scheduler.pending(Category::Deferred), 0);
                assert_eq!(scheduler.pending(Category::FrameSync), 0);
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_with_other_category_keeps_task() {
        let local = LocalSet::new();
        local
            .run_until(async {
                let scheduler = TokioScheduler::new(&SchedulerConfig::default());
                let count = Rc::new(Cell::new(0));
                let id = scheduler.schedule_delayed(counting(&count), Duration::from_millis(10));

                scheduler.cancel_repeating(id);

                sleep(Duration::from_millis(20)).await;
                assert_eq!(count.get(), 1);
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn zero_min_interval_config_does_not_panic() {
        let local = LocalSet::new();
        local
            .run_until(async {
                let config = SchedulerConfig {
                    min_interval_ms: 0,
                    frame_interval_ms: 0,
                };
                let scheduler = TokioScheduler::new(&config);
                let count = Rc::new(Cell::new(0));
                scheduler.schedule_repeating(counting(&count), Duration::ZERO);
                scheduler.schedule_frame_sync(counting(&count));

                sleep(Duration::from_millis(10)).await;
                // frame 1 回 + 1ms 間隔の repeating が複数回
                assert!(count.get() >= 4);
                assert_eq!(scheduler.pending(Category::Repeating), 1);
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_scheduler_aborts_outstanding_tasks() {
        let local = LocalSet::new();
        local
            .run_until(async {
                let scheduler = TokioScheduler::new(&SchedulerConfig::default());
                let count = Rc::new(Cell::new(0));
                scheduler.schedule_delayed(counting(&count), Duration::from_millis(10));
                scheduler.schedule_repeating(counting(&count), Duration::from_millis(10));

                drop(scheduler);

                sleep(Duration::from_millis(100)).await;
                assert_eq!(count.get(), 0);
            })
            .await;
    }
}
