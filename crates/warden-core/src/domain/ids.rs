//! Handle identifiers.
//!
//! スケジューラが発行する不透明なトークンです。
//! tracker はこの値をリストの所属判定とキャンセルにしか使いません。

use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::fmt;

/// Identifier of a scheduled callback.
///
/// 同じカテゴリの未完了ハンドルの中で一意です。
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HandleId(u64);

impl HandleId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl From<u64> for HandleId {
    fn from(raw: u64) -> Self {
        Self::new(raw)
    }
}

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "handle-{}", self.0)
    }
}

/// HandleIdAllocator は単調増加の HandleId を払い出す
///
/// # Thread Safety
/// - シングルスレッド前提なので `Cell` で十分
/// - 1 から始まり、再利用はしない
#[derive(Debug)]
pub struct HandleIdAllocator {
    next: Cell<u64>,
}

impl HandleIdAllocator {
    pub fn new() -> Self {
        Self { next: Cell::new(1) }
    }

    pub fn next_id(&self) -> HandleId {
        let raw = self.next.get();
        self.next.set(raw + 1);
        HandleId::new(raw)
    }
}

impl Default for HandleIdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocator_issues_unique_increasing_ids() {
        let ids = HandleIdAllocator::new();

        let id1 = ids.next_id();
        let id2 = ids.next_id();
        let id3 = ids.next_id();

        assert!(id1 < id2);
        assert!(id2 < id3);
        assert_eq!(id1.as_u64(), 1);
    }

    #[test]
    fn display_has_prefix() {
        assert_eq!(HandleId::new(7).to_string(), "handle-7");
    }

    #[test]
    fn serializes_as_plain_number() {
        let json = serde_json::to_string(&HandleId::new(42)).unwrap();
        assert_eq!(json, "42");
    }
}
