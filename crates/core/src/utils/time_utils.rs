use chrono::{DateTime, Datelike, Utc};

use crate::errors::{Result, ValidationError};

/// Converts epoch milliseconds to a UTC instant.
pub fn datetime_from_millis(ms: i64) -> Result<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_millis(ms)
        .ok_or_else(|| ValidationError::TimestampOutOfRange(ms).into())
}

/// Calendar (year, month) of an epoch-millisecond timestamp, in UTC.
pub fn year_month_of(ms: i64) -> Result<(i32, u32)> {
    let dt = datetime_from_millis(ms)?;
    Ok((dt.year(), dt.month()))
}

/// The month before `(year, month)`; January wraps to December of the previous year.
pub fn previous_month(year: i32, month: u32) -> (i32, u32) {
    if month <= 1 {
        (year - 1, 12)
    } else {
        (year, month - 1)
    }
}
