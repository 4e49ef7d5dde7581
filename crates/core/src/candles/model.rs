//! Candle domain models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use seasonality_market_data::Kline;

use crate::errors::Result;
use crate::utils::year_month_of;

/// One day of OHLCV data for a symbol, keyed by (symbol, timestamp).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyCandle {
    pub symbol: String,
    /// Open time of the day, epoch milliseconds
    pub timestamp: i64,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
    /// Close time of the day, epoch milliseconds
    pub close_time: i64,
}

impl DailyCandle {
    pub fn from_kline(symbol: &str, kline: &Kline) -> Self {
        Self {
            symbol: symbol.to_string(),
            timestamp: kline.open_time,
            open: kline.open,
            high: kline.high,
            low: kline.low,
            close: kline.close,
            volume: kline.volume,
            close_time: kline.close_time,
        }
    }

    /// Calendar month the candle belongs to, in UTC.
    pub fn year_month(&self) -> Result<(i32, u32)> {
        year_month_of(self.timestamp)
    }
}

/// Monthly OHLCV rollup keyed by (symbol, year, month).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyCandle {
    pub symbol: String,
    pub year: i32,
    /// 1-12
    pub month: u32,
    /// Open of the first daily candle in the month
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    /// Close of the last daily candle in the month
    pub close: Decimal,
    pub volume: Decimal,
    /// `(close - previous close) / previous close`, `None` without a previous month
    pub return_pct: Option<Decimal>,
}

/// A missing stretch of daily data, both ends inclusive, epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gap {
    pub start: i64,
    pub end: i64,
}

/// Outcome of rebuilding a symbol's monthly candles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonthlyRebuild {
    /// Months written successfully.
    pub written: usize,
    /// Months whose write failed even after a retry.
    pub failed: Vec<(i32, u32)>,
}

impl MonthlyRebuild {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}
