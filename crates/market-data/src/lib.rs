//! Seasonality Market Data Crate
//!
//! This crate talks to the upstream exchange for the seasonality ingestion
//! engine. It knows nothing about storage.
//!
//! # Overview
//!
//! - A resilient fetch client with bounded retries, exponential backoff,
//!   `Retry-After` handling and JSON content-type validation
//! - A shared [`RetryPolicy`] object passed down to every rate-limited caller
//! - The [`ExchangeClient`] trait and its Binance implementation
//!
//! # Architecture
//!
//! ```text
//! +------------------+
//! |  ExchangeClient  |  (BinanceClient: instruments, daily klines)
//! +------------------+
//!          |
//!          v
//! +------------------+     +------------------+
//! |   FetchClient    | --> |   RetryPolicy    |  (max retries, backoff, cooldown)
//! +------------------+     +------------------+
//!          |
//!          v
//! +------------------+     +------------------+
//! |  HttpTransport   |     |     Sleeper      |  (reqwest / tokio in production)
//! +------------------+     +------------------+
//! ```
//!
//! # Core Types
//!
//! - [`Instrument`] - Listed trading pair
//! - [`Kline`] - Daily OHLCV candle
//! - [`MarketDataError`] - Upstream error taxonomy with [`RetryClass`]

pub mod errors;
pub mod fetch;
pub mod models;
pub mod provider;

pub use errors::{MarketDataError, RetryClass};
pub use fetch::{
    FetchClient, FetchRequest, HttpMethod, HttpResponse, HttpTransport, RecordingSleeper,
    ReqwestTransport, RetryPolicy, Sleeper, TokioSleeper,
};
pub use models::{ExchangeInfo, Instrument, Kline};
pub use provider::{BinanceClient, ExchangeClient, DEFAULT_BASE_URL};
