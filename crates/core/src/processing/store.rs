use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use super::model::{ClaimOutcome, ProcessingState};
use crate::errors::Result;

/// Persistence for the single processing state row.
#[async_trait]
pub trait ProcessingStateStore: Send + Sync {
    /// Current state, `None` if it was never created. Has no side effects.
    fn load(&self) -> Result<Option<ProcessingState>>;

    /// Current state, creating an idle row on first use.
    async fn load_or_init(&self) -> Result<ProcessingState>;

    /// Persist `state` and return what was stored.
    async fn save(&self, state: &ProcessingState) -> Result<ProcessingState>;

    /// Claim the run atomically: load, apply [`ProcessingState::try_claim`]
    /// and persist in one step, so two invocations sharing the store cannot
    /// both claim a fresh run.
    async fn try_claim(&self, now: DateTime<Utc>, stale_after: Duration) -> Result<ClaimOutcome>;

    /// Cheap round trip to check the store is reachable.
    fn ping(&self) -> Result<()>;
}
