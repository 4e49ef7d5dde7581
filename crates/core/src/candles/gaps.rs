//! Gap detection over stored daily candles.

use log::{debug, warn};
use std::sync::Arc;

use seasonality_market_data::{RetryPolicy, Sleeper};

use super::model::Gap;
use super::store::CandleStore;
use crate::constants::{DAY_MS, GAP_THRESHOLD_MS};
use crate::utils::with_store_cooldown;

/// Computes missing sub-ranges from ascending stored timestamps.
///
/// - No timestamps: the whole `[start_ms, end_ms]` is one gap.
/// - Consecutive timestamps more than 1.5 days apart produce a gap from the
///   day after the earlier one to the day before the later one.
/// - More than 1.5 days between the last timestamp and `end_ms` produces a
///   trailing gap up to `end_ms`.
///
/// The result is ascending and non-overlapping.
pub fn detect_gaps(timestamps: &[i64], start_ms: i64, end_ms: i64) -> Vec<Gap> {
    let Some(&last) = timestamps.last() else {
        return vec![Gap {
            start: start_ms,
            end: end_ms,
        }];
    };

    let mut gaps: Vec<Gap> = timestamps
        .windows(2)
        .filter(|pair| pair[1] - pair[0] > GAP_THRESHOLD_MS)
        .map(|pair| Gap {
            start: pair[0] + DAY_MS,
            end: pair[1] - DAY_MS,
        })
        .collect();

    if end_ms - last > GAP_THRESHOLD_MS {
        gaps.push(Gap {
            start: last + DAY_MS,
            end: end_ms,
        });
    }

    gaps
}

/// Finds missing daily data for a symbol against the candle store.
pub struct GapDetector<C: CandleStore> {
    store: Arc<C>,
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
}

impl<C: CandleStore> GapDetector<C> {
    pub fn new(store: Arc<C>, policy: RetryPolicy, sleeper: Arc<dyn Sleeper>) -> Self {
        Self {
            store,
            policy,
            sleeper,
        }
    }

    /// Missing ranges for `symbol` within `[start_ms, end_ms]`.
    ///
    /// A throttled store read is retried once after the cooldown. Any other
    /// failure is logged and reported as "no gaps", so an empty result does
    /// not prove the series is complete.
    pub async fn find_gaps(&self, symbol: &str, start_ms: i64, end_ms: i64) -> Vec<Gap> {
        let label = format!("gap detection for {symbol}");
        let store = &self.store;
        let loaded = with_store_cooldown(&self.policy, self.sleeper.as_ref(), &label, || async move {
            store.daily_timestamps_in_range(symbol, start_ms, end_ms)
        })
        .await;

        match loaded {
            Ok(timestamps) => {
                let gaps = detect_gaps(&timestamps, start_ms, end_ms);
                debug!(
                    "{}: {} stored days, {} gaps in [{}, {}]",
                    symbol,
                    timestamps.len(),
                    gaps.len(),
                    start_ms,
                    end_ms
                );
                gaps
            }
            Err(e) => {
                warn!("Gap detection failed for {}, assuming no gaps: {}", symbol, e);
                Vec::new()
            }
        }
    }
}
