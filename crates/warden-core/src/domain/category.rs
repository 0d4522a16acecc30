//! Category - ハンドルの種類
//!
//! スケジューラが提供する 4 種類のコールバックを区別します。
//! - **Delayed**: 一定時間後に 1 回だけ実行
//! - **Repeating**: キャンセルされるまで一定間隔で実行
//! - **Deferred**: 現在の処理が終わった直後に 1 回だけ実行
//! - **FrameSync**: 次のフレームで 1 回だけ実行

use serde::{Deserialize, Serialize};
use std::fmt;

/// Category はハンドルの種類
///
/// ハンドルリストはこの単位で分かれています。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Delayed,
    Repeating,
    Deferred,
    FrameSync,
}

impl Category {
    /// 全カテゴリ（release_all の走査順）
    pub const ALL: [Category; 4] = [
        Category::Delayed,
        Category::Repeating,
        Category::Deferred,
        Category::FrameSync,
    ];

    /// 1 回実行したら終わるカテゴリかどうか
    ///
    /// one-shot のハンドルは発火直前にリストから自分を取り除きます。
    pub fn is_one_shot(self) -> bool {
        !matches!(self, Category::Repeating)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Delayed => "delayed",
            Category::Repeating => "repeating",
            Category::Deferred => "deferred",
            Category::FrameSync => "frame_sync",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::delayed(Category::Delayed, true)]
    #[case::repeating(Category::Repeating, false)]
    #[case::deferred(Category::Deferred, true)]
    #[case::frame_sync(Category::FrameSync, true)]
    fn one_shot_classification(#[case] category: Category, #[case] expected: bool) {
        assert_eq!(category.is_one_shot(), expected);
    }

    #[test]
    fn display_matches_serde_name() {
        for category in Category::ALL {
            let json = serde_json::to_string(&category).unwrap();
            assert_eq!(json, format!("\"{category}\""));
        }
    }
}
