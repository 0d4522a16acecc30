//! App - tracker 本体とホストへの組み込み
//!
//! # 主要コンポーネント
//! - **TimerTracker**: カテゴリごとのハンドル台帳と schedule / cancel / release_all
//! - **TimerHost**: set_timeout などの操作をホストに提供する trait
//! - **Timed**: ホストに tracker を合成した拡張ホスト（teardown で release_all）
//! - **compose_teardown**: 既存の teardown 手続きに release_all を繋ぐ
//! - **TrackerStatus**: カテゴリごとの件数ビュー

pub mod lifecycle;
pub mod mixin;
pub mod status;
pub mod tracker;

pub use self::lifecycle::{Lifecycle, Teardown, Timed, WithTimers, compose_teardown};
pub use self::mixin::TimerHost;
pub use self::status::TrackerStatus;
pub use self::tracker::TimerTracker;
