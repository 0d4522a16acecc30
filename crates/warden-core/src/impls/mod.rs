//! Impls - Scheduler port の実装
//!
//! # 含まれる実装
//! - **ManualScheduler**: 仮想時間。テストとデモ用
//! - **TokioScheduler**: tokio の local task で実行する
//!
//! 実アプリのイベントループ（GUI のフレームなど）に繋ぐ場合は、
//! 利用側で `Scheduler` を実装してください。

pub mod manual;
pub mod tokio_local;

pub use self::manual::ManualScheduler;
pub use self::tokio_local::TokioScheduler;
