//! Monthly rollup of daily candles.

use log::{debug, error, warn};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use seasonality_market_data::{RetryPolicy, Sleeper};

use super::model::{DailyCandle, MonthlyCandle, MonthlyRebuild};
use super::store::CandleStore;
use crate::errors::Result;
use crate::utils::{previous_month, with_store_cooldown};

/// Groups daily candles into calendar months (UTC) and computes OHLCV.
///
/// Candles may arrive in any order; within a month the first and last candle
/// are picked by timestamp. `return_pct` is left `None`; chaining against
/// the previous month happens in [`MonthlyAggregator::rebuild_monthly`].
/// Candles with out-of-range timestamps are skipped.
pub fn rollup_months(symbol: &str, daily: &[DailyCandle]) -> Vec<MonthlyCandle> {
    let mut groups: BTreeMap<(i32, u32), Vec<&DailyCandle>> = BTreeMap::new();
    for candle in daily {
        match candle.year_month() {
            Ok(key) => groups.entry(key).or_default().push(candle),
            Err(e) => warn!("Skipping candle for {}: {}", symbol, e),
        }
    }

    groups
        .into_iter()
        .filter_map(|((year, month), mut candles)| {
            candles.sort_by_key(|c| c.timestamp);
            let first = candles.first()?;
            let last = candles.last()?;
            let high = candles.iter().map(|c| c.high).max()?;
            let low = candles.iter().map(|c| c.low).min()?;
            let volume = candles.iter().map(|c| c.volume).sum::<Decimal>();

            Some(MonthlyCandle {
                symbol: symbol.to_string(),
                year,
                month,
                open: first.open,
                high,
                low,
                close: last.close,
                volume,
                return_pct: None,
            })
        })
        .collect()
}

/// Period-over-period return, `None` when there is no usable previous close.
pub fn month_return(close: Decimal, previous_close: Option<Decimal>) -> Option<Decimal> {
    let previous = previous_close?;
    (close - previous).checked_div(previous)
}

/// Rebuilds monthly candles for a symbol from its stored daily candles.
pub struct MonthlyAggregator<C: CandleStore> {
    store: Arc<C>,
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
}

impl<C: CandleStore> MonthlyAggregator<C> {
    pub fn new(store: Arc<C>, policy: RetryPolicy, sleeper: Arc<dyn Sleeper>) -> Self {
        Self {
            store,
            policy,
            sleeper,
        }
    }

    /// Recomputes and upserts every month of `symbol`, oldest first.
    ///
    /// Months are processed in ascending order so each month reads the
    /// close its predecessor just wrote. A month whose write fails is logged
    /// and recorded in the result; the following month then gets a `None`
    /// return instead of one chained to stale data. Only loading the daily
    /// candles can fail the whole call.
    pub async fn rebuild_monthly(&self, symbol: &str) -> Result<MonthlyRebuild> {
        let label = format!("monthly rebuild for {symbol}");
        let store = &self.store;
        let daily = with_store_cooldown(&self.policy, self.sleeper.as_ref(), &label, || async move {
            store.daily_candles(symbol)
        })
        .await?;

        let months = rollup_months(symbol, &daily);
        let mut failed: HashSet<(i32, u32)> = HashSet::new();
        let mut result = MonthlyRebuild::default();

        for mut month in months {
            let key = (month.year, month.month);
            let (prev_year, prev_month) = previous_month(month.year, month.month);

            let previous_close = if failed.contains(&(prev_year, prev_month)) {
                None
            } else {
                match self.store.get_monthly_candle(symbol, prev_year, prev_month) {
                    Ok(prev) => prev.map(|m| m.close),
                    Err(e) => {
                        warn!(
                            "Could not read {}-{:02} for {}: {}",
                            prev_year, prev_month, symbol, e
                        );
                        None
                    }
                }
            };
            month.return_pct = month_return(month.close, previous_close);

            let month_label = format!("{} {}-{:02}", symbol, month.year, month.month);
            let candle = &month;
            let written =
                with_store_cooldown(&self.policy, self.sleeper.as_ref(), &month_label, || {
                    async move { store.upsert_monthly_candle(candle).await }
                })
                .await;

            match written {
                Ok(_) => result.written += 1,
                Err(e) => {
                    error!("Failed to store monthly candle {}: {}", month_label, e);
                    failed.insert(key);
                    result.failed.push(key);
                }
            }
        }

        debug!(
            "Rebuilt {} months for {} ({} failed)",
            result.written,
            symbol,
            result.failed.len()
        );
        Ok(result)
    }
}
