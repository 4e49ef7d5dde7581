//! Exchange client trait definitions.

use async_trait::async_trait;

use crate::errors::MarketDataError;
use crate::models::{Instrument, Kline};

/// Trait for exchanges that can list instruments and serve daily candles.
///
/// Implement this trait to add support for a new exchange. The ingestion
/// engine only ever talks to an exchange through it.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use seasonality_market_data::provider::ExchangeClient;
///
/// struct MyExchange;
///
/// #[async_trait]
/// impl ExchangeClient for MyExchange {
///     fn id(&self) -> &'static str {
///         "MY_EXCHANGE"
///     }
///
///     async fn list_instruments(&self) -> Result<Vec<Instrument>, MarketDataError> {
///         // ...
///     }
///
///     async fn daily_klines(
///         &self,
///         symbol: &str,
///         start_ms: i64,
///         end_ms: i64,
///         limit: u32,
///     ) -> Result<Vec<Kline>, MarketDataError> {
///         // ...
///     }
/// }
/// ```
#[async_trait]
pub trait ExchangeClient: Send + Sync {
    /// Identifier used in logs.
    fn id(&self) -> &'static str;

    /// Every instrument the exchange lists, whatever its status.
    async fn list_instruments(&self) -> Result<Vec<Instrument>, MarketDataError>;

    /// Daily candles with open time in `[start_ms, end_ms]`, ascending,
    /// at most `limit` of them.
    async fn daily_klines(
        &self,
        symbol: &str,
        start_ms: i64,
        end_ms: i64,
        limit: u32,
    ) -> Result<Vec<Kline>, MarketDataError>;

    /// Daily candles for the whole of `[start_ms, end_ms]`.
    ///
    /// Requests pages of `page_limit` and advances past the last returned
    /// open time until the range is covered or a short page comes back.
    async fn daily_klines_paged(
        &self,
        symbol: &str,
        start_ms: i64,
        end_ms: i64,
        page_limit: u32,
    ) -> Result<Vec<Kline>, MarketDataError> {
        let mut klines: Vec<Kline> = Vec::new();
        let mut cursor = start_ms;

        while cursor <= end_ms {
            let page = self.daily_klines(symbol, cursor, end_ms, page_limit).await?;
            let Some(last_open) = page.last().map(|k| k.open_time) else {
                break;
            };
            let full_page = page.len() >= page_limit as usize;
            klines.extend(page);

            if !full_page || last_open < cursor {
                break;
            }
            cursor = last_open + 1;
        }

        Ok(klines)
    }
}
