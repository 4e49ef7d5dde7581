//! Storage trait for daily and monthly candles.

use async_trait::async_trait;

use super::model::{DailyCandle, MonthlyCandle};
use crate::errors::Result;

/// Persistence for daily candles and their monthly rollups.
///
/// Writes are idempotent upserts on the natural keys (symbol, timestamp) and
/// (symbol, year, month), so overlapping runs never duplicate rows.
#[async_trait]
pub trait CandleStore: Send + Sync {
    // =========================================================================
    // Daily candles
    // =========================================================================

    /// Insert or replace daily candles. Returns the number of rows written.
    async fn upsert_daily_candles(&self, candles: &[DailyCandle]) -> Result<usize>;

    /// Stored open times for `symbol` within `[start_ms, end_ms]`, ascending.
    fn daily_timestamps_in_range(
        &self,
        symbol: &str,
        start_ms: i64,
        end_ms: i64,
    ) -> Result<Vec<i64>>;

    /// Every daily candle for `symbol`, ascending by timestamp.
    fn daily_candles(&self, symbol: &str) -> Result<Vec<DailyCandle>>;

    /// Open time of the newest stored candle for `symbol`.
    fn latest_daily_timestamp(&self, symbol: &str) -> Result<Option<i64>>;

    /// Total number of daily candles across all symbols.
    fn count_daily_candles(&self) -> Result<i64>;

    // =========================================================================
    // Monthly candles
    // =========================================================================

    /// Insert or fully replace one monthly candle.
    async fn upsert_monthly_candle(&self, candle: &MonthlyCandle) -> Result<MonthlyCandle>;

    fn get_monthly_candle(&self, symbol: &str, year: i32, month: u32)
        -> Result<Option<MonthlyCandle>>;

    /// Monthly candles for `symbol`, ascending by (year, month).
    fn monthly_history(&self, symbol: &str) -> Result<Vec<MonthlyCandle>>;
}
