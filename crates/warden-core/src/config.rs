//! Config - スケジューラ設定
//!
//! # 読み込み順
//! 1. JSON（文字列またはファイル）。省略したキーはデフォルト値
//! 2. 環境変数で上書き（`WARDEN_FRAME_INTERVAL_MS`, `WARDEN_MIN_INTERVAL_MS`）
//! 3. `validate()` で 0 を弾く

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const ENV_FRAME_INTERVAL_MS: &str = "WARDEN_FRAME_INTERVAL_MS";
pub const ENV_MIN_INTERVAL_MS: &str = "WARDEN_MIN_INTERVAL_MS";

/// スケジューラに渡す間隔の下限（未検証の設定でも 0 にはしない）
const FLOOR_INTERVAL: Duration = Duration::from_millis(1);

/// ConfigError は設定読み込み時のエラー
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid value for {key}: {value:?}")]
    InvalidEnv { key: &'static str, value: String },

    #[error("frame_interval_ms must be greater than zero")]
    ZeroFrameInterval,

    #[error("min_interval_ms must be greater than zero")]
    ZeroMinInterval,
}

/// SchedulerConfig はスケジューラ実装の共通設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// frame_sync コールバックの間隔（約 60fps）
    pub frame_interval_ms: u64,
    /// repeating の最小間隔（0 間隔の無限ループ防止）
    pub min_interval_ms: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            frame_interval_ms: 16,
            min_interval_ms: 1,
        }
    }
}

impl SchedulerConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// プロセスの環境変数で上書き
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// `lookup` で見つかったキーだけ上書きする
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(ms) = parse_ms(&lookup, ENV_FRAME_INTERVAL_MS)? {
            self.frame_interval_ms = ms;
        }
        if let Some(ms) = parse_ms(&lookup, ENV_MIN_INTERVAL_MS)? {
            self.min_interval_ms = ms;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.frame_interval_ms == 0 {
            return Err(ConfigError::ZeroFrameInterval);
        }
        if self.min_interval_ms == 0 {
            return Err(ConfigError::ZeroMinInterval);
        }
        Ok(())
    }

    /// 0 は `FLOOR_INTERVAL` に切り上げる
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms).max(FLOOR_INTERVAL)
    }

    /// 0 は `FLOOR_INTERVAL` に切り上げる
    pub fn min_interval(&self) -> Duration {
        Duration::from_millis(self.min_interval_ms).max(FLOOR_INTERVAL)
    }
}

fn parse_ms<F>(lookup: &F, key: &'static str) -> Result<Option<u64>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(value) = lookup(key) else {
        return Ok(None);
    };
    value
        .trim()
        .parse::<u64>()
        .map(Some)
        .map_err(|_| ConfigError::InvalidEnv { key, value })
}
