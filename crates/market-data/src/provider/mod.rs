//! Exchange client abstraction and implementations.
//!
//! This module contains:
//! - The `ExchangeClient` trait the ingestion engine depends on
//! - `BinanceClient`, the production implementation over the public
//!   Binance REST API (or any API-compatible mirror)

mod traits;

pub mod binance;

// Re-exports
pub use binance::{BinanceClient, DEFAULT_BASE_URL};
pub use traits::ExchangeClient;
