//! SQLite storage implementation for the seasonality engine.
//!
//! This crate provides all database-related functionality using Diesel ORM with SQLite.
//! It implements the store traits defined in `seasonality-core` and contains:
//! - Database connection pooling and management
//! - Diesel migrations
//! - Repository implementations for symbols, candles and processing state
//! - Database-specific model types (with Diesel derives)
//!
//! # Architecture
//!
//! This crate is the only place in the application where Diesel dependencies exist.
//! The core crate is database-agnostic and works with traits.
//!
//! ```text
//!        core (domain, store traits)
//!                  │
//!                  ▼
//!          storage-sqlite (this crate)
//!                  │
//!        pool (reads) + WriteHandle (serialised writes)
//!                  │
//!                  ▼
//!              SQLite DB
//! ```

pub mod db;
pub mod errors;
pub mod schema;
pub mod utils;

// Repository implementations
pub mod candles;
pub mod processing;
pub mod symbols;

// Re-export database utilities
pub use db::{
    create_pool, get_connection, init, open, run_migrations, spawn_writer,
    DbConnection, DbPool, WriteHandle,
};

pub use candles::CandleRepository;
pub use processing::ProcessingStateRepository;
pub use symbols::SymbolRepository;

// Re-export storage errors and conversion helpers
pub use errors::{IntoCore, StorageError};

// Re-export from seasonality-core for convenience
pub use seasonality_core::errors::{DatabaseError, Error, Result};
