use std::cell::Cell;
use std::rc::Rc;

use tokio::task::LocalSet;
use tokio::time::{Duration, sleep};
use tracing::info;
use tracing_subscriber::EnvFilter;

use warden_core::config::{ConfigError, SchedulerConfig};
use warden_core::impls::TokioScheduler;
use warden_core::{Category, Lifecycle, TimerHost, WithTimers};

/// デモ用のホスト：tick 数を数えるだけ
struct Ticker {
    name: &'static str,
    ticks: Rc<Cell<u32>>,
}

impl Lifecycle for Ticker {
    fn teardown(&mut self) {
        info!(host = self.name, ticks = self.ticks.get(), "host teardown");
    }
}

/// 設定：第 1 引数の JSON ファイル（任意）→ 環境変数で上書き
fn load_config() -> Result<SchedulerConfig, ConfigError> {
    let config = match std::env::args().nth(1) {
        Some(path) => SchedulerConfig::from_path(path)?,
        None => SchedulerConfig::default(),
    };
    config.with_env_overrides()
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), ConfigError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = load_config()?;
    info!(?config, "loaded config");

    let local = LocalSet::new();
    local
        .run_until(async move {
            let scheduler = Rc::new(TokioScheduler::new(&config));

            // (A) ホストに tracker を合成
            let ticks = Rc::new(Cell::new(0));
            let mut ticker = Ticker {
                name: "ticker",
                ticks: ticks.clone(),
            }
            .with_timers(scheduler.clone());

            // (B) 4 種類のコールバックを予約
            let counter = ticks.clone();
            ticker.set_interval(move || counter.set(counter.get() + 1), Duration::from_millis(50));
            ticker.set_immediate(|| info!("immediate fired"));
            ticker.request_animation_frame(|| info!("frame fired"));
            ticker.set_timeout(|| info!("timeout fired"), Duration::from_millis(120));
            let never = ticker.set_timeout(|| info!("this never fires"), Duration::from_secs(10));

            // (C) しばらく動かしてから状態を表示
            sleep(Duration::from_millis(200)).await;
            ticker.clear_timeout(never);
            match serde_json::to_string(&ticker.timers().status()) {
                Ok(json) => println!("status before teardown: {json}"),
                Err(e) => info!(error = %e, "status serialization failed"),
            }

            // (D) teardown：ホスト側の処理 → release_all
            ticker.teardown();
            sleep(Duration::from_millis(200)).await;

            println!(
                "ticks={} pending_intervals={}",
                ticks.get(),
                scheduler.pending(Category::Repeating)
            );
        })
        .await;

    Ok(())
}
