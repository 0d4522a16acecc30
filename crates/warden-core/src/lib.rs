//! warden-core
//!
//! ホストが作ったタイマー系ハンドルを追跡し、teardown 時にまとめて解放します。
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（Category, HandleId, HandleLists）
//! - **ports**: 抽象化レイヤー（Scheduler）
//! - **app**: tracker 本体とホストへの組み込み（TimerTracker, TimerHost, Timed）
//! - **impls**: Scheduler の実装（ManualScheduler, TokioScheduler）
//! - **config**: スケジューラ設定

pub mod app;
pub mod config;
pub mod domain;
pub mod impls;
pub mod ports;

pub use app::{Lifecycle, TimerHost, TimerTracker, Timed, WithTimers};
pub use domain::{Category, HandleId};
pub use ports::Scheduler;
