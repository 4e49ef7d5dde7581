//! Utility functions for SQLite storage operations.
//!
//! Multi-row inserts bind one parameter per column per row, so large batches
//! are split to stay under SQLite's bound-parameter limit.

use chrono::{DateTime, Utc};
use seasonality_core::errors::{Result, ValidationError};

/// Bound parameters allowed per statement.
///
/// SQLITE_MAX_VARIABLE_NUMBER defaults to 999 on older builds; stay below it.
pub const SQLITE_MAX_PARAMS: usize = 900;

/// Rows per multi-row insert for a table with `columns` columns.
pub fn rows_per_insert(columns: usize) -> usize {
    (SQLITE_MAX_PARAMS / columns.max(1)).max(1)
}

/// Chunk `items` so each chunk can be inserted in one statement.
pub fn chunk_for_sqlite<T>(items: &[T], columns: usize) -> impl Iterator<Item = &[T]> {
    items.chunks(rows_per_insert(columns))
}

/// Timestamps are stored as RFC 3339 text.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| ValidationError::DateTimeParse(e).into())
}

pub fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339()
}
