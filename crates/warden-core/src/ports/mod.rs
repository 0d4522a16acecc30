//! Ports - 抽象化レイヤー
//!
//! tracker の外側にある実行基盤へのインターフェースを定義します。
//! タイマーやフレームコールバックの実体は外部から与えられる前提です。

pub mod scheduler;

pub use self::scheduler::{Callback, Scheduler};
