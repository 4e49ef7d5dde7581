//! Resumable ingestion runs.
//!
//! - [`report`] - Run phases and per-slice reports
//! - [`traits`] - Operations exposed to front ends
//! - [`service`] - The orchestrator
//!
//! # Architecture
//!
//! ```text
//! IngestionService ──► ExchangeClient (market-data crate)
//!        │
//!        ├──► ProgressTracker ──► ProcessingStateStore
//!        ├──► SymbolStore
//!        └──► GapDetector / MonthlyAggregator ──► CandleStore
//! ```
//!
//! Every store is a trait, so the engine runs against SQLite in production
//! and in-memory mocks in tests.

pub mod report;
pub mod service;
pub mod traits;

#[cfg(test)]
mod service_tests;

pub use report::{RunPhase, SliceOutcome, SliceReport, SymbolReport, SymbolStatus, SymbolWork};
pub use service::IngestionService;
pub use traits::IngestionServiceTrait;
