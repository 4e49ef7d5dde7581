//! Seasonality Core - ingestion engine, domain models and storage traits.
//!
//! This crate holds the business logic for keeping daily candles up to date
//! and deriving monthly seasonality from them. It is database-agnostic and
//! defines traits that are implemented by the `storage-sqlite` crate.

pub mod candles;
pub mod config;
pub mod constants;
pub mod errors;
pub mod ingestion;
pub mod processing;
pub mod symbols;
pub mod utils;

pub use config::IngestionConfig;
pub use ingestion::{IngestionService, IngestionServiceTrait};

// Re-export error types
pub use errors::Error;
pub use errors::Result;
