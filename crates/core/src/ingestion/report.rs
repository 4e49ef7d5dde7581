//! Run phases and slice reports.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::processing::ProcessingState;

// =============================================================================
// Run Phase
// =============================================================================

/// States of one ingestion invocation, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RunPhase {
    Idle,
    ClaimingRun,
    FetchingUniverse,
    UpdatingRegistry,
    CheckingBootstrap,
    SelectingSymbols,
    ProcessingSymbol,
    Done,
    Paused,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunPhase::Idle => "idle",
            RunPhase::ClaimingRun => "claiming run",
            RunPhase::FetchingUniverse => "fetching universe",
            RunPhase::UpdatingRegistry => "updating registry",
            RunPhase::CheckingBootstrap => "checking bootstrap",
            RunPhase::SelectingSymbols => "selecting symbols",
            RunPhase::ProcessingSymbol => "processing symbol",
            RunPhase::Done => "done",
            RunPhase::Paused => "paused",
        };
        f.write_str(name)
    }
}

// =============================================================================
// Per-symbol results
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SymbolStatus {
    Success,
    Skipped,
    Failed,
}

/// What the per-symbol step did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolWork {
    /// True when the symbol was fresh and nothing was fetched.
    pub skipped: bool,
    /// Full history was fetched instead of an incremental update.
    pub full_history: bool,
    pub gaps_filled: usize,
    pub candles_stored: usize,
    pub months_written: usize,
    pub months_failed: usize,
}

impl SymbolWork {
    pub fn skipped() -> Self {
        Self {
            skipped: true,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolReport {
    pub symbol: String,
    pub index: usize,
    pub status: SymbolStatus,
    pub work: SymbolWork,
    pub error: Option<String>,
}

// =============================================================================
// Slice report
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum SliceOutcome {
    /// The working list was finished and the state reset to idle.
    Completed,
    /// Stopped early; the next invocation starts at `next_index`.
    #[serde(rename_all = "camelCase")]
    Paused { next_index: usize },
    /// Another invocation holds the run; nothing was done.
    AlreadyRunning,
}

/// Result of one `run_ingestion_slice` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SliceReport {
    pub processed_count: usize,
    pub success_count: usize,
    pub error_count: usize,
    pub skipped_count: usize,
    pub percent_complete: u32,
    pub is_bootstrap: bool,
    pub total_symbols: usize,
    pub outcome: SliceOutcome,
    pub symbols: Vec<SymbolReport>,
}

impl SliceReport {
    pub(crate) fn new(is_bootstrap: bool, total_symbols: usize) -> Self {
        Self {
            processed_count: 0,
            success_count: 0,
            error_count: 0,
            skipped_count: 0,
            percent_complete: 0,
            is_bootstrap,
            total_symbols,
            outcome: SliceOutcome::Completed,
            symbols: Vec::new(),
        }
    }

    /// Report for an invocation that found another run in progress.
    pub fn already_running(state: &ProcessingState) -> Self {
        Self {
            percent_complete: state.percent_complete(),
            total_symbols: usize::try_from(state.total_symbols).unwrap_or(0),
            outcome: SliceOutcome::AlreadyRunning,
            ..Self::new(false, 0)
        }
    }

    pub(crate) fn add(&mut self, report: SymbolReport) {
        self.processed_count += 1;
        match report.status {
            SymbolStatus::Success => self.success_count += 1,
            SymbolStatus::Skipped => self.skipped_count += 1,
            SymbolStatus::Failed => self.error_count += 1,
        }
        self.symbols.push(report);
    }

    pub fn is_already_running(&self) -> bool {
        self.outcome == SliceOutcome::AlreadyRunning
    }

    /// One-line summary for logs.
    pub fn summary(&self) -> String {
        match &self.outcome {
            SliceOutcome::AlreadyRunning => "Run already in progress".to_string(),
            SliceOutcome::Completed => format!(
                "Completed: {} processed ({} ok, {} skipped, {} failed)",
                self.processed_count, self.success_count, self.skipped_count, self.error_count
            ),
            SliceOutcome::Paused { next_index } => format!(
                "Paused at {}/{} ({}%): {} processed ({} ok, {} skipped, {} failed)",
                next_index,
                self.total_symbols,
                self.percent_complete,
                self.processed_count,
                self.success_count,
                self.skipped_count,
                self.error_count
            ),
        }
    }
}
