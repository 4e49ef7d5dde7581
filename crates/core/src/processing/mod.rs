//! Persisted progress of the ingestion run.

mod model;
mod store;
mod tracker;

pub use model::{ClaimOutcome, ProcessingState, ProcessingStatus};
pub use store::ProcessingStateStore;
pub use tracker::ProgressTracker;
