//! Ingestion engine constants.

/// Milliseconds in one day.
pub const DAY_MS: i64 = 86_400_000;

/// Gap threshold: consecutive stored candles further apart than this are
/// considered to have missing days in between. 1.5 days tolerates upstream
/// cadence quirks without flagging every single-day step.
pub const GAP_THRESHOLD_MS: i64 = DAY_MS * 3 / 2;

/// Days of history fetched for a symbol with no stored candles.
pub const DEFAULT_HISTORY_DAYS: i64 = 730;

/// Upper bound on the history window (100 years).
pub const MAX_HISTORY_DAYS: i64 = 36_500;

/// A symbol whose latest candle is newer than this is skipped.
pub const DEFAULT_FRESHNESS_HOURS: i64 = 48;

/// A run older than this is treated as abandoned.
pub const DEFAULT_STALE_RUN_MINUTES: i64 = 10;

/// Symbols processed per invocation.
pub const DEFAULT_SYMBOLS_PER_INVOCATION: usize = 1;

/// Quote asset the symbol universe is filtered to.
pub const DEFAULT_QUOTE_ASSET: &str = "USDT";

/// Bootstrap allowlist used while no candles are stored yet.
pub const DEFAULT_POPULAR_SYMBOLS: &[&str] = &[
    "BTCUSDT", "ETHUSDT", "BNBUSDT", "XRPUSDT", "ADAUSDT", "DOGEUSDT", "SOLUSDT", "MATICUSDT",
];

/// Registry upserts per batch.
pub const DEFAULT_REGISTRY_BATCH_SIZE: usize = 5;

/// Candle limit for the small window after the latest stored candle.
pub const INCREMENTAL_KLINE_LIMIT: u32 = 10;

/// Candle limit per request when backfilling a gap.
pub const GAP_KLINE_LIMIT: u32 = 1000;

/// Candle limit per page when fetching full history.
pub const HISTORY_PAGE_LIMIT: u32 = 1000;

/// Daily candles written per store call.
pub const CANDLE_WRITE_BATCH: usize = 500;

/// Id of the single processing state row.
pub const PROCESSING_STATE_ID: i32 = 1;

/// Short month names indexed by `month - 1`.
pub const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];
