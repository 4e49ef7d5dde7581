//! Processing state models.
//!
//! A single persisted [`ProcessingState`] row records how far the current
//! run got, so a stateless, periodically invoked process can resume where
//! the previous invocation stopped.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Processing State
// =============================================================================

/// Progress of the current processing run.
///
/// Invariants:
/// - `last_processed_index` is `-1` before any symbol completes and below
///   `total_symbols` afterwards
/// - `is_processing` is true only while a run holds the claim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingState {
    pub id: i32,
    pub last_processed_symbol: Option<String>,
    pub last_processed_index: i64,
    pub total_symbols: i64,
    pub is_processing: bool,
    pub started_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl ProcessingState {
    /// Fresh idle state: nothing processed, not claimed.
    pub fn new(id: i32, now: DateTime<Utc>) -> Self {
        Self {
            id,
            last_processed_symbol: None,
            last_processed_index: -1,
            total_symbols: 0,
            is_processing: false,
            started_at: None,
            updated_at: now,
        }
    }

    /// True when a claimed run has been going for longer than `threshold`.
    ///
    /// A claimed run without a start time cannot be aged and counts as stale.
    pub fn is_stale(&self, now: DateTime<Utc>, threshold: Duration) -> bool {
        self.is_processing
            && self
                .started_at
                .map_or(true, |started| now - started > threshold)
    }

    /// Check-then-set claim.
    ///
    /// Refuses while another non-stale run holds the claim. Otherwise marks
    /// the run as processing from `now`. Taking over a stale run keeps its
    /// position so the new run resumes after the last completed symbol.
    pub fn try_claim(mut self, now: DateTime<Utc>, threshold: Duration) -> ClaimOutcome {
        if self.is_processing && !self.is_stale(now, threshold) {
            return ClaimOutcome::AlreadyRunning(self);
        }

        let took_over_stale = self.is_processing;
        self.is_processing = true;
        self.started_at = Some(now);
        self.updated_at = now;
        ClaimOutcome::Claimed {
            state: self,
            took_over_stale,
        }
    }

    /// Index to start from for a working list of `total` symbols.
    ///
    /// Resumes after the last processed index when that index is valid and
    /// not the final one; otherwise starts over at zero.
    pub fn resume_index(&self, total: usize) -> usize {
        match usize::try_from(self.last_processed_index) {
            Ok(last) if last + 1 < total => last + 1,
            _ => 0,
        }
    }

    /// Records the working list size for progress reporting.
    pub fn begin_slice(&mut self, total: usize, now: DateTime<Utc>) {
        self.total_symbols = i64::try_from(total).unwrap_or(i64::MAX);
        self.updated_at = now;
    }

    /// Records that `symbol` at `index` is done (succeeded, skipped or failed).
    pub fn record_progress(&mut self, symbol: &str, index: usize, now: DateTime<Utc>) {
        self.last_processed_symbol = Some(symbol.to_string());
        self.last_processed_index = i64::try_from(index).unwrap_or(i64::MAX);
        self.updated_at = now;
    }

    /// The run reached the end of the list: back to idle at index -1.
    pub fn complete(&mut self, now: DateTime<Utc>) {
        self.last_processed_index = -1;
        self.is_processing = false;
        self.updated_at = now;
    }

    /// Gives up the claim but keeps the position for the next invocation.
    pub fn release(&mut self, now: DateTime<Utc>) {
        self.is_processing = false;
        self.updated_at = now;
    }

    /// `round((index + 1) / total * 100)`, or 0 with no symbols.
    pub fn percent_complete(&self) -> u32 {
        if self.total_symbols <= 0 {
            return 0;
        }
        let done = (self.last_processed_index + 1).clamp(0, self.total_symbols);
        ((done as f64 / self.total_symbols as f64) * 100.0).round() as u32
    }

    pub fn remaining_symbols(&self) -> i64 {
        (self.total_symbols - (self.last_processed_index + 1)).max(0)
    }
}

// =============================================================================
// Claim Outcome
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimOutcome {
    /// This invocation owns the run.
    Claimed {
        state: ProcessingState,
        /// A previous run was abandoned and got taken over.
        took_over_stale: bool,
    },
    /// Another invocation is still working; nothing was changed.
    AlreadyRunning(ProcessingState),
}

// =============================================================================
// Processing Status
// =============================================================================

/// Read-only summary of the processing state for status displays.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingStatus {
    /// False when no state row has ever been written.
    pub exists: bool,
    pub is_processing: bool,
    pub is_stale: bool,
    pub last_processed_symbol: Option<String>,
    pub last_processed_index: i64,
    pub total_symbols: i64,
    pub percent_complete: u32,
    pub remaining_symbols: i64,
    pub started_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    /// Seconds since start while running, start to last update when idle.
    pub duration_secs: Option<i64>,
    /// Seconds since the last update, only when idle.
    pub last_updated_secs: Option<i64>,
}

impl ProcessingStatus {
    pub fn from_state(
        state: Option<&ProcessingState>,
        now: DateTime<Utc>,
        stale_after: Duration,
    ) -> Self {
        let Some(state) = state else {
            return Self {
                last_processed_index: -1,
                ..Self::default()
            };
        };

        let (duration_secs, last_updated_secs) = match state.started_at {
            Some(started) if state.is_processing => (Some((now - started).num_seconds()), None),
            Some(started) => (
                Some((state.updated_at - started).num_seconds()),
                Some((now - state.updated_at).num_seconds()),
            ),
            None => (None, None),
        };

        Self {
            exists: true,
            is_processing: state.is_processing,
            is_stale: state.is_stale(now, stale_after),
            last_processed_symbol: state.last_processed_symbol.clone(),
            last_processed_index: state.last_processed_index,
            total_symbols: state.total_symbols,
            percent_complete: state.percent_complete(),
            remaining_symbols: state.remaining_symbols(),
            started_at: state.started_at,
            updated_at: Some(state.updated_at),
            duration_secs,
            last_updated_secs,
        }
    }
}
