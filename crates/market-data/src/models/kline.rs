use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;

use crate::errors::MarketDataError;

/// One daily OHLCV candle.
///
/// The exchange sends klines as positional arrays:
/// `[openTime, open, high, low, close, volume, closeTime, ...]` with prices
/// as decimal strings. Trailing fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Kline {
    /// Open time, epoch milliseconds
    pub open_time: i64,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
    /// Close time, epoch milliseconds
    pub close_time: i64,
}

impl Kline {
    /// Decodes a single positional kline row.
    pub fn from_row(row: &Value) -> Result<Self, MarketDataError> {
        let fields = row
            .as_array()
            .ok_or_else(|| MarketDataError::InvalidKline(format!("expected array, got {row}")))?;

        if fields.len() < 7 {
            return Err(MarketDataError::InvalidKline(format!(
                "expected at least 7 fields, got {}",
                fields.len()
            )));
        }

        Ok(Self {
            open_time: int_at(fields, 0, "openTime")?,
            open: decimal_at(fields, 1, "open")?,
            high: decimal_at(fields, 2, "high")?,
            low: decimal_at(fields, 3, "low")?,
            close: decimal_at(fields, 4, "close")?,
            volume: decimal_at(fields, 5, "volume")?,
            close_time: int_at(fields, 6, "closeTime")?,
        })
    }

    /// Decodes a klines response body (an array of rows).
    pub fn from_response(body: &Value) -> Result<Vec<Self>, MarketDataError> {
        body.as_array()
            .ok_or_else(|| MarketDataError::Parse("klines response is not an array".to_string()))?
            .iter()
            .map(Self::from_row)
            .collect()
    }
}

fn int_at(fields: &[Value], idx: usize, name: &str) -> Result<i64, MarketDataError> {
    fields[idx]
        .as_i64()
        .ok_or_else(|| MarketDataError::InvalidKline(format!("{name} is not an integer")))
}

fn decimal_at(fields: &[Value], idx: usize, name: &str) -> Result<Decimal, MarketDataError> {
    let parsed = match &fields[idx] {
        Value::String(s) => Decimal::from_str(s).ok(),
        Value::Number(n) => Decimal::from_str(&n.to_string()).ok(),
        _ => None,
    };
    parsed.ok_or_else(|| MarketDataError::InvalidKline(format!("{name} is not a decimal")))
}
