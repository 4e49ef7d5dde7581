//! Periodic ingestion for long-running deployments.
//!
//! Each tick runs one slice; the persisted progress carries the position
//! between ticks exactly as it does between separate process invocations.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info, warn};

use seasonality_core::ingestion::SliceOutcome;

use crate::main_lib::AppState;

/// Runs a slice every `period` until Ctrl-C.
pub async fn run_watch_loop(state: Arc<AppState>, period: Duration) -> anyhow::Result<()> {
    info!("Watching: one ingestion slice every {:?}", period);

    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => run_scheduled_slice(&state).await,
            result = tokio::signal::ctrl_c() => {
                result?;
                info!("Shutdown requested, stopping watch loop");
                return Ok(());
            }
        }
    }
}

async fn run_scheduled_slice(state: &Arc<AppState>) {
    match state.ingestion_service.run_ingestion_slice().await {
        Ok(report) => match report.outcome {
            SliceOutcome::AlreadyRunning => {
                warn!("Skipped tick: another run holds the claim")
            }
            _ => info!("Scheduled slice finished: {}", report.summary()),
        },
        Err(e) => error!("Scheduled slice failed: {}", e),
    }
}
