//! Exchange wire models
//!
//! - `instrument` - Listed trading pairs (Instrument, ExchangeInfo)
//! - `kline` - Daily OHLCV candles decoded from positional arrays (Kline)

mod instrument;
mod kline;

pub use instrument::{ExchangeInfo, Instrument, TRADING_STATUS};
pub use kline::Kline;
