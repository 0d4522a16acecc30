//! TimerHost - tracker の操作をホストに生やす trait
//!
//! `timers()` さえ実装すれば、ホストは set_timeout などの操作をそのまま使えます。
//! one-shot 系は `FnOnce` を受け取り、repeating 系は `FnMut` を受け取ります。

use std::time::Duration;

use super::tracker::TimerTracker;
use crate::domain::{Category, HandleId};
use crate::ports::Scheduler;

/// `FnOnce` を一度だけ呼ぶ `FnMut` に変換
fn once<F: FnOnce() + 'static>(callback: F) -> impl FnMut() + 'static {
    let mut callback = Some(callback);
    move || {
        if let Some(callback) = callback.take() {
            callback();
        }
    }
}

/// TimerHost はホスト単位で追跡されるタイマー操作を提供
///
/// # 使用例
/// ```ignore
/// struct Widget { timers: TimerTracker<ManualScheduler> }
///
/// impl TimerHost for Widget {
///     type Scheduler = ManualScheduler;
///     fn timers(&self) -> &TimerTracker<ManualScheduler> { &self.timers }
/// }
///
/// let id = widget.set_timeout(|| println!("later"), Duration::from_millis(100));
/// widget.clear_timeout(id);
/// ```
pub trait TimerHost {
    type Scheduler: Scheduler + 'static;

    fn timers(&self) -> &TimerTracker<Self::Scheduler>;

    fn set_timeout<F>(&self, callback: F, delay: Duration) -> HandleId
    where
        F: FnOnce() + 'static,
    {
        self.timers().schedule(Category::Delayed, once(callback), delay)
    }

    fn clear_timeout(&self, id: HandleId) {
        self.timers().cancel(Category::Delayed, id);
    }

    fn set_interval<F>(&self, callback: F, interval: Duration) -> HandleId
    where
        F: FnMut() + 'static,
    {
        self.timers().schedule(Category::Repeating, callback, interval)
    }

    fn clear_interval(&self, id: HandleId) {
        self.timers().cancel(Category::Repeating, id);
    }

    fn set_immediate<F>(&self, callback: F) -> HandleId
    where
        F: FnOnce() + 'static,
    {
        self.timers()
            .schedule(Category::Deferred, once(callback), Duration::ZERO)
    }

    fn clear_immediate(&self, id: HandleId) {
        self.timers().cancel(Category::Deferred, id);
    }

    fn request_animation_frame<F>(&self, callback: F) -> HandleId
    where
        F: FnOnce() + 'static,
    {
        self.timers()
            .schedule(Category::FrameSync, once(callback), Duration::ZERO)
    }

    fn cancel_animation_frame(&self, id: HandleId) {
        self.timers().cancel(Category::FrameSync, id);
    }

    /// teardown 時に呼ぶ release_all
    fn release_timers(&self) {
        self.timers().release_all();
    }
}
