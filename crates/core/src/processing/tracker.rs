use chrono::{DateTime, Duration, Utc};
use log::{error, info, warn};
use std::sync::Arc;

use super::model::{ClaimOutcome, ProcessingState, ProcessingStatus};
use super::store::ProcessingStateStore;
use crate::errors::Result;

/// Reads and writes the persisted processing state and applies the
/// staleness rule.
pub struct ProgressTracker<P: ProcessingStateStore> {
    store: Arc<P>,
    stale_after: Duration,
}

impl<P: ProcessingStateStore> ProgressTracker<P> {
    pub fn new(store: Arc<P>, stale_after: Duration) -> Self {
        Self { store, stale_after }
    }

    pub async fn save(&self, state: &ProcessingState) -> Result<ProcessingState> {
        self.store.save(state).await
    }

    /// Claims the run unless a fresh one is in progress.
    pub async fn claim(&self, now: DateTime<Utc>) -> Result<ClaimOutcome> {
        let outcome = self.store.try_claim(now, self.stale_after).await?;
        match &outcome {
            ClaimOutcome::Claimed {
                took_over_stale: true,
                state,
            } => warn!(
                "Taking over stale run (last index {}, {} symbols)",
                state.last_processed_index, state.total_symbols
            ),
            ClaimOutcome::Claimed { .. } => info!("Processing run claimed"),
            ClaimOutcome::AlreadyRunning(state) => info!(
                "Run already in progress since {:?}, exiting",
                state.started_at
            ),
        }
        Ok(outcome)
    }

    /// Best-effort release after a fatal error so the claim does not
    /// outlive the failed run. Errors are logged, never returned.
    pub async fn release_after_failure(&self, now: DateTime<Utc>) {
        let mut state = match self.store.load_or_init().await {
            Ok(state) => state,
            Err(e) => {
                error!("Could not load processing state to release it: {}", e);
                return;
            }
        };
        state.release(now);
        if let Err(e) = self.store.save(&state).await {
            error!("Could not release processing state: {}", e);
        }
    }

    /// Read-only status summary.
    pub fn status(&self, now: DateTime<Utc>) -> Result<ProcessingStatus> {
        let state = self.store.load()?;
        Ok(ProcessingStatus::from_state(
            state.as_ref(),
            now,
            self.stale_after,
        ))
    }

    pub fn ping(&self) -> Result<()> {
        self.store.ping()
    }
}
