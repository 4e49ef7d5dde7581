//! Core error types for the seasonality engine.
//!
//! This module defines database-agnostic error types. Storage-specific errors
//! (from Diesel, SQLite, etc.) are converted to these types by the storage layer.

use chrono::ParseError as ChronoParseError;
use thiserror::Error;

use seasonality_market_data::MarketDataError;

use crate::ingestion::RunPhase;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the ingestion engine.
///
/// Database-specific errors are wrapped in string form to keep this type
/// database-agnostic.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Database operation failed: {0}")]
    Database(#[from] DatabaseError),

    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Invalid configuration value: {0}")]
    InvalidConfigValue(String),

    #[error("Missing configuration key: {0}")]
    MissingConfigKey(String),

    #[error("Market data operation failed: {0}")]
    MarketData(#[from] MarketDataError),

    /// A run precondition failed; the claim was released before returning.
    #[error("Ingestion run aborted while {phase}: {source}")]
    RunAborted {
        phase: RunPhase,
        #[source]
        source: Box<Error>,
    },

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl Error {
    /// True when the store itself asked us to slow down.
    ///
    /// Covers SQLite lock contention as well as remote stores that relay an
    /// HTTP 429 in their error text.
    pub fn is_store_throttled(&self) -> bool {
        match self {
            Error::Database(DatabaseError::Busy(_)) => true,
            Error::Database(other) => is_throttle_message(&other.to_string()),
            _ => false,
        }
    }

    pub fn run_aborted(phase: RunPhase, source: Error) -> Self {
        Error::RunAborted {
            phase,
            source: Box::new(source),
        }
    }
}

/// Recognises throttling signals embedded in a storage error message.
///
/// A bare `429` is not enough: it shows up in ids and timestamps.
pub fn is_throttle_message(message: &str) -> bool {
    let lower = message.to_ascii_lowercase();
    lower.contains("too many requests")
        || ["status 429", "status: 429", "status code 429", "http 429"]
            .iter()
            .any(|marker| lower.contains(marker))
        || lower.contains("database is locked")
        || lower.contains("database is busy")
}

/// Database-agnostic error type for storage operations.
///
/// This enum uses `String` for all error details, allowing the storage layer
/// to convert storage-specific errors (Diesel, SQLite, etc.) into this format.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to establish a database connection.
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Failed to create or configure the connection pool.
    #[error("Failed to create database pool: {0}")]
    PoolCreationFailed(String),

    /// A database query failed to execute.
    #[error("Database query failed: {0}")]
    QueryFailed(String),

    /// The requested record was not found.
    #[error("Record not found: {0}")]
    NotFound(String),

    /// A unique constraint was violated (e.g., duplicate key).
    #[error("Unique constraint violation: {0}")]
    UniqueViolation(String),

    /// The store is throttling or locked; retry after a cooldown.
    #[error("Rate limit exceeded: {0}")]
    Busy(String),

    /// Database migration failed.
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// Internal/unexpected database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

/// Validation errors for stored and incoming data.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Failed to parse decimal number: {0}")]
    DecimalParse(#[from] rust_decimal::Error),

    #[error("Failed to parse date/time: {0}")]
    DateTimeParse(#[from] ChronoParseError),

    #[error("Timestamp {0} is out of range")]
    TimestampOutOfRange(i64),
}

// === From implementations for common error types ===

impl From<rust_decimal::Error> for Error {
    fn from(err: rust_decimal::Error) -> Self {
        Error::Validation(ValidationError::DecimalParse(err))
    }
}

impl From<ChronoParseError> for Error {
    fn from(err: ChronoParseError) -> Self {
        Error::Validation(ValidationError::DateTimeParse(err))
    }
}

impl From<Error> for String {
    fn from(err: Error) -> Self {
        err.to_string()
    }
}
