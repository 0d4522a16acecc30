//! Status - tracker の状態ビュー
//!
//! # 使用例
//! ```ignore
//! let status = tracker.status();
//! println!("{}", serde_json::to_string(&status)?);
//! ```

use serde::{Deserialize, Serialize};

use crate::domain::{Category, HandleLists};

/// Outstanding handle counts per category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerStatus {
    pub delayed: usize,
    pub repeating: usize,
    pub deferred: usize,
    pub frame_sync: usize,
}

impl TrackerStatus {
    pub fn from_lists(lists: &HandleLists) -> Self {
        Self {
            delayed: lists.len(Category::Delayed),
            repeating: lists.len(Category::Repeating),
            deferred: lists.len(Category::Deferred),
            frame_sync: lists.len(Category::FrameSync),
        }
    }

    pub fn total(&self) -> usize {
        self.delayed + self.repeating + self.deferred + self.frame_sync
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::HandleId;

    #[test]
    fn serializes_with_snake_case_fields() {
        let mut lists = HandleLists::new();
        lists.push(Category::FrameSync, HandleId::new(1));

        let json = serde_json::to_value(TrackerStatus::from_lists(&lists)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "delayed": 0, "repeating": 0, "deferred": 0, "frame_sync": 1 })
        );
    }
}
