//! ManualScheduler - 仮想時間で動くスケジューラ（テスト・デモ用）
//!
//! # 学習ポイント
//! - BTreeMap を (due, seq) キーの優先度キューとして使う
//! - コールバック実行中は RefCell の借用を手放す（再入対応）
//! - 実行中に自分自身を cancel した repeating は再登録しない

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::time::Duration;

use tracing::trace;

use crate::config::SchedulerConfig;
use crate::domain::{Category, HandleId, HandleIdAllocator};
use crate::ports::{Callback, Scheduler};

struct Entry {
    category: Category,
    /// 実行中は None（repeating のみ）
    callback: Option<Callback>,
    period: Option<Duration>,
}

#[derive(Default)]
struct State {
    now: Duration,
    seq: u64,
    timers: BTreeMap<(Duration, u64), HandleId>,
    deferred: VecDeque<HandleId>,
    frames: VecDeque<HandleId>,
    entries: HashMap<HandleId, Entry>,
    cancels: Vec<(Category, HandleId)>,
}

impl State {
    fn arm(&mut self, id: HandleId, due: Duration) {
        let seq = self.seq;
        self.seq += 1;
        self.timers.insert((due, seq), id);
    }
}

/// ManualScheduler は明示的に時間を進める Scheduler 実装
///
/// # 実装詳細
/// - delayed / repeating: `advance()` で期限が来たものを期限順に実行
/// - deferred: `run_deferred()` で呼び出し時点のキューを実行
/// - frame_sync: `next_frame()` で呼び出し時点のキューを実行
/// - cancel は全て `cancel_calls()` に記録される（カテゴリ不一致でも）
///
/// # 使用例
/// ```ignore
/// let scheduler = ManualScheduler::new();
/// scheduler.schedule_delayed(Box::new(|| println!("hi")), Duration::from_millis(10));
/// assert_eq!(scheduler.advance(Duration::from_millis(10)), 1);
/// ```
pub struct ManualScheduler {
    ids: HandleIdAllocator,
    min_interval: Duration,
    state: RefCell<State>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::with_config(&SchedulerConfig::default())
    }

    pub fn with_config(config: &SchedulerConfig) -> Self {
        Self {
            ids: HandleIdAllocator::new(),
            min_interval: config.min_interval(),
            state: RefCell::new(State::default()),
        }
    }

    /// 仮想時刻（生成時からの経過）
    pub fn now(&self) -> Duration {
        self.state.borrow().now
    }

    /// 時間を `by` だけ進め、期限が来た delayed / repeating を実行
    ///
    /// 実行したコールバックの数を返す。
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.now() + by;
        let mut fired = 0;
        while let Some((id, due)) = self.pop_due(target) {
            if self.fire_timer(id, due) {
                fired += 1;
            }
        }
        self.state.borrow_mut().now = target;
        fired
    }

    /// 呼び出し時点でキューにある deferred を実行
    pub fn run_deferred(&self) -> usize {
        let batch = std::mem::take(&mut self.state.borrow_mut().deferred);
        self.fire_batch(batch)
    }

    /// 呼び出し時点でキューにある frame_sync を実行
    pub fn next_frame(&self) -> usize {
        let batch = std::mem::take(&mut self.state.borrow_mut().frames);
        self.fire_batch(batch)
    }

    /// まだ実行もキャンセルもされていないエントリ数
    pub fn pending(&self, category: Category) -> usize {
        self.state
            .borrow()
            .entries
            .values()
            .filter(|entry| entry.category == category)
            .count()
    }

    /// これまでの cancel 呼び出し（呼ばれた順）
    pub fn cancel_calls(&self) -> Vec<(Category, HandleId)> {
        self.state.borrow().cancels.clone()
    }

    pub fn cancel_count(&self, category: Category) -> usize {
        self.state
            .borrow()
            .cancels
            .iter()
            .filter(|(c, _)| *c == category)
            .count()
    }

    fn pop_due(&self, target: Duration) -> Option<(HandleId, Duration)> {
        let mut state = self.state.borrow_mut();
        let (&(due, seq), &id) = state.timers.first_key_value()?;
        if due > target {
            return None;
        }
        state.timers.remove(&(due, seq));
        state.now = due;
        Some((id, due))
    }

    fn fire_timer(&self, id: HandleId, due: Duration) -> bool {
        let (mut callback, period) = {
            let mut state = self.state.borrow_mut();
            let period = match state.entries.get(&id) {
                Some(entry) => entry.period,
                // cancel 済み
                None => return false,
            };
            let callback = match period {
                Some(_) => state.entries.get_mut(&id).and_then(|e| e.callback.take()),
                None => state.entries.remove(&id).and_then(|e| e.callback),
            };
            let Some(callback) = callback else {
                return false;
            };
            (callback, period)
        };

        trace!(handle = %id, ?due, "firing timer");
        callback();

        if let Some(period) = period {
            let mut state = self.state.borrow_mut();
            if let Some(entry) = state.entries.get_mut(&id) {
                entry.callback = Some(callback);
                state.arm(id, due + period);
            }
        }
        true
    }

    fn fire_batch(&self, batch: VecDeque<HandleId>) -> usize {
        let mut fired = 0;
        for id in batch {
            let callback = self
                .state
                .borrow_mut()
                .entries
                .remove(&id)
                .and_then(|entry| entry.callback);
            if let Some(mut callback) = callback {
                trace!(handle = %id, "firing queued callback");
                callback();
                fired += 1;
            }
        }
        fired
    }

    fn insert(&self, category: Category, callback: Callback, period: Option<Duration>) -> HandleId {
        let id = self.ids.next_id();
        self.state.borrow_mut().entries.insert(
            id,
            Entry {
                category,
                callback: Some(callback),
                period,
            },
        );
        id
    }

    fn cancel_entry(&self, category: Category, id: HandleId) {
        let mut state = self.state.borrow_mut();
        state.cancels.push((category, id));
        if state
            .entries
            .get(&id)
            .is_some_and(|entry| entry.category == category)
        {
            // キュー側のキーは残るが、発火時にエントリが無ければ読み飛ばす
            state.entries.remove(&id);
        }
    }
}

impl Default for ManualScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for ManualScheduler {
    fn schedule_delayed(&self, callback: Callback, delay: Duration) -> HandleId {
        let id = self.insert(Category::Delayed, callback, None);
        let mut state = self.state.borrow_mut();
        let due = state.now + delay;
        state.arm(id, due);
        id
    }

    fn cancel_delayed(&self, id: HandleId) {
        self.cancel_entry(Category::Delayed, id);
    }

    fn schedule_repeating(&self, callback: Callback, interval: Duration) -> HandleId {
        let interval = interval.max(self.min_interval);
        let id = self.insert(Category::Repeating, callback, Some(interval));
        let mut state = self.state.borrow_mut();
        let due = state.now + interval;
        state.arm(id, due);
        id
    }

    fn cancel_repeating(&self, id: HandleId) {
        self.cancel_entry(Category::Repeating, id);
    }

    fn schedule_deferred(&self, callback: Callback) -> HandleId {
        let id = self.insert(Category::Deferred, callback, None);
        self.state.borrow_mut().deferred.push_back(id);
        id
    }

    fn cancel_deferred(&self, id: HandleId) {
        self.cancel_entry(Category::Deferred, id);
    }

    fn schedule_frame_sync(&self, callback: Callback) -> HandleId {
        let id = self.insert(Category::FrameSync, callback, None);
        self.state.borrow_mut().frames.push_back(id);
        id
    }

    fn cancel_frame_sync(&self, id: HandleId) {
        self.cancel_entry(Category::FrameSync, id);
    }
}
