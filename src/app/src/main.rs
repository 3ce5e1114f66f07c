use crate::config::Config;
use pt_feeds_pumpportal::PumpPortalSubscriber;
use pt_price_recorder::PriceRecorder;
use pt_snapshot::SnapshotWriter;
use pt_subscriber::Subscriber;
use pt_types::TradeEventProcessor;
use std::io;
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

mod config;

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt().with_writer(io::stdout).init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    info!(
        "Service started. Tracking {} tokens, snapshot at {}",
        config.tracked_mints.len(),
        config.snapshot_path.display(),
    );

    abort_on_panic();

    let shutdown = CancellationToken::new();

    let feed = PumpPortalSubscriber::new(&config.feed_url, &config.api_key, config.tracked_mints);
    let manager = Subscriber::new(feed).run(shutdown.clone());

    let recorder = PriceRecorder::new(SnapshotWriter::new(config.snapshot_path));
    let recorder_handle = recorder.run(manager.subscribe_trade_events(), shutdown.clone());

    tokio::signal::ctrl_c().await.unwrap();

    info!("Service stopping");
    shutdown.cancel();
    let _ = recorder_handle.await;
    info!("Service stopped");
    ExitCode::SUCCESS
}

pub fn abort_on_panic() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        default_hook(panic_info);
        std::process::abort();
    }));
}
