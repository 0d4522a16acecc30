//! TimerTracker - ホストが作ったハンドルの追跡
//!
//! # 学習ポイント
//! - `Rc<RefCell<_>>` による単一スレッドでの共有状態
//! - `Weak` で循環参照を避けたコールバックのラップ
//! - 借用をコールバック実行前に手放して再入可能にする

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use tracing::{debug, trace};

use super::status::TrackerStatus;
use crate::domain::{Category, HandleId, HandleLists};
use crate::ports::{Callback, Scheduler};

/// TimerTracker はホスト 1 つ分のハンドル台帳とスケジューラを束ねる
///
/// # 使用例
/// ```ignore
/// let tracker = TimerTracker::new(Rc::new(ManualScheduler::new()));
/// let id = tracker.schedule(Category::Delayed, || println!("tick"), Duration::from_millis(100));
/// tracker.cancel(Category::Delayed, id);
/// tracker.release_all();
/// ```
///
/// # Clone
/// clone は同じ台帳を共有するハンドルを返します（別ホスト用の台帳ではない）。
pub struct TimerTracker<S: Scheduler> {
    scheduler: Rc<S>,
    lists: Rc<RefCell<HandleLists>>,
}

impl<S: Scheduler + 'static> TimerTracker<S> {
    pub fn new(scheduler: Rc<S>) -> Self {
        Self {
            scheduler,
            lists: Rc::new(RefCell::new(HandleLists::new())),
        }
    }

    pub fn scheduler(&self) -> &Rc<S> {
        &self.scheduler
    }

    /// コールバックを予約して id を台帳に載せる
    ///
    /// # フロー
    /// 1. one-shot ならラッパーで包む（発火直前に自分の id を台帳から外す）
    /// 2. スケジューラに渡して id を受け取る
    /// 3. 台帳に追加（リストがなければ作成）
    pub fn schedule<F>(&self, category: Category, callback: F, delay: Duration) -> HandleId
    where
        F: FnMut() + 'static,
    {
        // スケジューラが id を返すまで自分の id はわからない
        let slot: Rc<Cell<Option<HandleId>>> = Rc::new(Cell::new(None));

        let wrapped: Callback = if category.is_one_shot() {
            let lists = Rc::downgrade(&self.lists);
            let slot = slot.clone();
            let mut callback = callback;
            Box::new(move || {
                if let (Some(lists), Some(id)) = (lists.upgrade(), slot.get()) {
                    lists.borrow_mut().remove(category, id);
                    trace!(%category, handle = %id, "fired");
                }
                callback();
            })
        } else {
            Box::new(callback)
        };

        let id = self.scheduler.schedule(category, wrapped, delay);
        slot.set(Some(id));
        self.lists.borrow_mut().push(category, id);
        debug!(%category, handle = %id, ?delay, "scheduled");
        id
    }

    /// 台帳から外してスケジューラにキャンセルを伝える
    ///
    /// 台帳に無い id でもスケジューラの cancel は必ず呼ぶ。
    pub fn cancel(&self, category: Category, id: HandleId) {
        let tracked = self.lists.borrow_mut().remove(category, id);
        self.scheduler.cancel(category, id);
        debug!(%category, handle = %id, tracked, "cancelled");
    }

    /// 全カテゴリの未完了ハンドルをキャンセルし、台帳を absent に戻す
    ///
    /// 一度も schedule していなければ何もしない。
    pub fn release_all(&self) {
        for category in Category::ALL {
            let Some(ids) = self.lists.borrow_mut().take(category) else {
                continue;
            };
            for id in &ids {
                self.scheduler.cancel(category, *id);
            }
            debug!(%category, count = ids.len(), "released");
        }
    }

    /// 未完了の id 一覧（schedule 順）
    pub fn outstanding(&self, category: Category) -> Vec<HandleId> {
        self.lists
            .borrow()
            .get(category)
            .map(<[HandleId]>::to_vec)
            .unwrap_or_default()
    }

    pub fn len(&self, category: Category) -> usize {
        self.lists.borrow().len(category)
    }

    pub fn is_empty(&self) -> bool {
        self.lists.borrow().total() == 0
    }

    /// リストが present か（release_all 後は false）
    pub fn is_tracking(&self, category: Category) -> bool {
        self.lists.borrow().is_present(category)
    }

    pub fn status(&self) -> TrackerStatus {
        TrackerStatus::from_lists(&self.lists.borrow())
    }
}

impl<S: Scheduler> Clone for TimerTracker<S> {
    fn clone(&self) -> Self {
        Self {
            scheduler: self.scheduler.clone(),
            lists: self.lists.clone(),
        }
    }
}
