//! SQLite storage implementation for daily and monthly candles.

mod model;
mod repository;

pub use model::{DailyCandleDB, MonthlyCandleDB};
pub use repository::CandleRepository;
