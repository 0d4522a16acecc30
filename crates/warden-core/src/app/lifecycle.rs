//! Lifecycle - ホストの teardown と release_all の合成
//!
//! # 学習ポイント
//! - `FnOnce` による「一度しか呼べない」teardown の表現
//! - 継承ではなく合成でホストを拡張する（`Timed<H, S>`）
//! - `Drop` による取りこぼし防止
//!
//! # 順序
//! どの合成方法でも、ホスト自身の teardown が先、release_all が後です。

use std::ops::{Deref, DerefMut};
use std::rc::Rc;

use tracing::debug;

use super::mixin::TimerHost;
use super::tracker::TimerTracker;
use crate::ports::Scheduler;

/// 合成済みの teardown 手続き
pub type Teardown = Box<dyn FnOnce() + 'static>;

/// ホストの teardown 手続きに release_all を後ろから繋ぐ
///
/// `original` が `None` なら release_all だけを行う手続きを返す。
///
/// # Example
/// ```ignore
/// let teardown = compose_teardown(Some(Box::new(|| println!("bye"))), tracker.clone());
/// teardown(); // "bye" の後に release_all
/// ```
pub fn compose_teardown<S>(original: Option<Teardown>, tracker: TimerTracker<S>) -> Teardown
where
    S: Scheduler + 'static,
{
    Box::new(move || {
        if let Some(original) = original {
            original();
        }
        tracker.release_all();
    })
}

/// Lifecycle は teardown を持つホスト
///
/// teardown を持たないホストはデフォルト実装（何もしない）のままでよい。
pub trait Lifecycle {
    fn teardown(&mut self) {}
}

/// Timed はホストに tracker を合成した拡張ホスト
///
/// # 使用例
/// ```ignore
/// let mut widget = Widget::new().with_timers(scheduler.clone());
/// widget.set_timeout(|| println!("later"), Duration::from_millis(100));
/// widget.teardown(); // Widget::teardown → release_all
/// ```
///
/// # 保証
/// - teardown はインスタンスごとに一度だけ実行される
/// - teardown されずに drop された場合は drop 時に実行される
pub struct Timed<H: Lifecycle, S: Scheduler + 'static> {
    host: H,
    timers: TimerTracker<S>,
    torn_down: bool,
}

impl<H: Lifecycle, S: Scheduler + 'static> Timed<H, S> {
    pub fn new(host: H, scheduler: Rc<S>) -> Self {
        Self {
            host,
            timers: TimerTracker::new(scheduler),
            torn_down: false,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }
}

impl<H: Lifecycle, S: Scheduler + 'static> Lifecycle for Timed<H, S> {
    fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.host.teardown();
        self.timers.release_all();
        debug!("host torn down");
    }
}

impl<H: Lifecycle, S: Scheduler + 'static> TimerHost for Timed<H, S> {
    type Scheduler = S;

    fn timers(&self) -> &TimerTracker<S> {
        &self.timers
    }
}

impl<H: Lifecycle, S: Scheduler + 'static> Deref for Timed<H, S> {
    type Target = H;

    fn deref(&self) -> &H {
        &self.host
    }
}

impl<H: Lifecycle, S: Scheduler + 'static> DerefMut for Timed<H, S> {
    fn deref_mut(&mut self) -> &mut H {
        &mut self.host
    }
}

impl<H: Lifecycle, S: Scheduler + 'static> Drop for Timed<H, S> {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// 任意の Lifecycle ホストを Timed に包む拡張 trait
pub trait WithTimers: Lifecycle + Sized {
    fn with_timers<S: Scheduler + 'static>(self, scheduler: Rc<S>) -> Timed<Self, S> {
        Timed::new(self, scheduler)
    }
}

impl<H: Lifecycle> WithTimers for H {}
