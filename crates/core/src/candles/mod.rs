//! Daily and monthly candles.
//!
//! ```text
//! Kline ──► DailyCandle ──► GapDetector (missing ranges)
//!                 │
//!                 └──────► MonthlyAggregator ──► MonthlyCandle ──► SeasonalitySummary
//! ```

mod gaps;
mod model;
mod monthly;
mod seasonality;
mod store;

pub use gaps::{detect_gaps, GapDetector};
pub use model::{DailyCandle, Gap, MonthlyCandle, MonthlyRebuild};
pub use monthly::{month_return, rollup_months, MonthlyAggregator};
pub use seasonality::{MonthlyAverage, SeasonalitySummary};
pub use store::CandleStore;
