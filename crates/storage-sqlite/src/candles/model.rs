//! Database models for candles.
//!
//! Prices and volumes are stored as decimal text so nothing is lost to
//! floating point; they are parsed back strictly.

use diesel::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use seasonality_core::candles::{DailyCandle, MonthlyCandle};
use seasonality_core::errors::ValidationError;
use seasonality_core::{Error, Result};

/// Columns per daily candle row, for insert chunking.
pub const DAILY_CANDLE_COLUMNS: usize = 8;

#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::daily_candles)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct DailyCandleDB {
    pub symbol: String,
    pub timestamp: i64,
    pub open: String,
    pub high: String,
    pub low: String,
    pub close: String,
    pub volume: String,
    pub close_time: i64,
}

#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::monthly_candles)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct MonthlyCandleDB {
    pub symbol: String,
    pub year: i32,
    pub month: i32,
    pub open: String,
    pub high: String,
    pub low: String,
    pub close: String,
    pub volume: String,
    pub return_pct: Option<String>,
}

fn decimal(value: &str) -> Result<Decimal> {
    Decimal::from_str(value).map_err(Error::from)
}

impl From<&DailyCandle> for DailyCandleDB {
    fn from(candle: &DailyCandle) -> Self {
        Self {
            symbol: candle.symbol.clone(),
            timestamp: candle.timestamp,
            open: candle.open.to_string(),
            high: candle.high.to_string(),
            low: candle.low.to_string(),
            close: candle.close.to_string(),
            volume: candle.volume.to_string(),
            close_time: candle.close_time,
        }
    }
}

impl TryFrom<DailyCandleDB> for DailyCandle {
    type Error = Error;

    fn try_from(db: DailyCandleDB) -> Result<Self> {
        Ok(DailyCandle {
            open: decimal(&db.open)?,
            high: decimal(&db.high)?,
            low: decimal(&db.low)?,
            close: decimal(&db.close)?,
            volume: decimal(&db.volume)?,
            symbol: db.symbol,
            timestamp: db.timestamp,
            close_time: db.close_time,
        })
    }
}

impl From<&MonthlyCandle> for MonthlyCandleDB {
    fn from(candle: &MonthlyCandle) -> Self {
        Self {
            symbol: candle.symbol.clone(),
            year: candle.year,
            month: candle.month as i32,
            open: candle.open.to_string(),
            high: candle.high.to_string(),
            low: candle.low.to_string(),
            close: candle.close.to_string(),
            volume: candle.volume.to_string(),
            return_pct: candle.return_pct.map(|r| r.to_string()),
        }
    }
}

impl TryFrom<MonthlyCandleDB> for MonthlyCandle {
    type Error = Error;

    fn try_from(db: MonthlyCandleDB) -> Result<Self> {
        let month = u32::try_from(db.month)
            .ok()
            .filter(|m| (1..=12).contains(m))
            .ok_or_else(|| {
                ValidationError::InvalidInput(format!("month {} out of range", db.month))
            })?;

        Ok(MonthlyCandle {
            open: decimal(&db.open)?,
            high: decimal(&db.high)?,
            low: decimal(&db.low)?,
            close: decimal(&db.close)?,
            volume: decimal(&db.volume)?,
            return_pct: db.return_pct.as_deref().map(decimal).transpose()?,
            symbol: db.symbol,
            year: db.year,
            month,
        })
    }
}
