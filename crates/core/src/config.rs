//! Engine configuration.
//!
//! Every tunable of the ingestion engine lives in [`IngestionConfig`].
//! Defaults reproduce the production constants; [`IngestionConfig::from_env`]
//! overlays `SEASONALITY_*` environment variables.

use std::str::FromStr;
use std::time::Duration;

use seasonality_market_data::RetryPolicy;

use crate::constants::*;
use crate::errors::{Error, Result};

pub const ENV_POPULAR_SYMBOLS: &str = "SEASONALITY_POPULAR_SYMBOLS";
pub const ENV_QUOTE_ASSET: &str = "SEASONALITY_QUOTE_ASSET";
pub const ENV_SYMBOLS_PER_RUN: &str = "SEASONALITY_SYMBOLS_PER_RUN";
pub const ENV_HISTORY_DAYS: &str = "SEASONALITY_HISTORY_DAYS";
pub const ENV_FRESHNESS_HOURS: &str = "SEASONALITY_FRESHNESS_HOURS";
pub const ENV_STALE_MINUTES: &str = "SEASONALITY_STALE_MINUTES";
pub const ENV_MAX_RETRIES: &str = "SEASONALITY_MAX_RETRIES";
pub const ENV_INITIAL_BACKOFF_MS: &str = "SEASONALITY_INITIAL_BACKOFF_MS";
pub const ENV_COOLDOWN_MS: &str = "SEASONALITY_COOLDOWN_MS";
pub const ENV_PACING: &str = "SEASONALITY_PACING";

/// Deliberate pauses that keep request volume under the upstream rate limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    /// Between two symbol registry upserts.
    pub between_registry_items: Duration,
    /// After each registry batch.
    pub between_registry_batches: Duration,
    /// Between two processed symbols.
    pub between_symbols: Duration,
}

impl Pacing {
    /// No pauses at all.
    pub fn none() -> Self {
        Self {
            between_registry_items: Duration::ZERO,
            between_registry_batches: Duration::ZERO,
            between_symbols: Duration::ZERO,
        }
    }
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            between_registry_items: Duration::from_millis(500),
            between_registry_batches: Duration::from_secs(5),
            between_symbols: Duration::from_secs(8),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IngestionConfig {
    /// Symbols processed while no daily candles exist yet.
    pub popular_symbols: Vec<String>,
    /// Only instruments quoted in this asset enter the universe.
    pub quote_asset: String,
    /// Upper bound on symbols handled by one invocation.
    pub symbols_per_invocation: usize,
    /// Depth of a full history fetch.
    pub history_days: i64,
    /// Symbols updated more recently than this are skipped.
    pub freshness_window: chrono::Duration,
    /// Runs older than this may be taken over.
    pub stale_run_after: chrono::Duration,
    pub retry: RetryPolicy,
    pub pacing: Pacing,
    pub registry_batch_size: usize,
    pub incremental_limit: u32,
    pub gap_limit: u32,
    pub history_page_limit: u32,
    pub candle_write_batch: usize,
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            popular_symbols: DEFAULT_POPULAR_SYMBOLS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            quote_asset: DEFAULT_QUOTE_ASSET.to_string(),
            symbols_per_invocation: DEFAULT_SYMBOLS_PER_INVOCATION,
            history_days: DEFAULT_HISTORY_DAYS,
            freshness_window: chrono::Duration::hours(DEFAULT_FRESHNESS_HOURS),
            stale_run_after: chrono::Duration::minutes(DEFAULT_STALE_RUN_MINUTES),
            retry: RetryPolicy::default(),
            pacing: Pacing::default(),
            registry_batch_size: DEFAULT_REGISTRY_BATCH_SIZE,
            incremental_limit: INCREMENTAL_KLINE_LIMIT,
            gap_limit: GAP_KLINE_LIMIT,
            history_page_limit: HISTORY_PAGE_LIMIT,
            candle_write_batch: CANDLE_WRITE_BATCH,
        }
    }
}

impl IngestionConfig {
    /// Defaults overlaid with `SEASONALITY_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overlaid with values from `lookup`. Blank values are ignored.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(list) = get(ENV_POPULAR_SYMBOLS) {
            config.popular_symbols = list
                .split(',')
                .map(|s| s.trim().to_ascii_uppercase())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Some(quote) = get(ENV_QUOTE_ASSET) {
            config.quote_asset = quote.trim().to_ascii_uppercase();
        }
        if let Some(v) = get(ENV_SYMBOLS_PER_RUN) {
            config.symbols_per_invocation = parse(ENV_SYMBOLS_PER_RUN, &v)?;
        }
        if let Some(v) = get(ENV_HISTORY_DAYS) {
            config.history_days = parse(ENV_HISTORY_DAYS, &v)?;
        }
        if let Some(v) = get(ENV_FRESHNESS_HOURS) {
            config.freshness_window =
                duration_from(ENV_FRESHNESS_HOURS, &v, chrono::Duration::try_hours)?;
        }
        if let Some(v) = get(ENV_STALE_MINUTES) {
            config.stale_run_after =
                duration_from(ENV_STALE_MINUTES, &v, chrono::Duration::try_minutes)?;
        }
        if let Some(v) = get(ENV_MAX_RETRIES) {
            config.retry.max_retries = parse(ENV_MAX_RETRIES, &v)?;
        }
        if let Some(v) = get(ENV_INITIAL_BACKOFF_MS) {
            config.retry.initial_backoff =
                Duration::from_millis(parse(ENV_INITIAL_BACKOFF_MS, &v)?);
        }
        if let Some(v) = get(ENV_COOLDOWN_MS) {
            config.retry.stale_cooldown = Duration::from_millis(parse(ENV_COOLDOWN_MS, &v)?);
        }
        if let Some(v) = get(ENV_PACING) {
            match v.trim().to_ascii_lowercase().as_str() {
                "off" | "none" | "false" => config.pacing = Pacing::none(),
                "on" | "default" | "true" => config.pacing = Pacing::default(),
                other => {
                    return Err(Error::InvalidConfigValue(format!(
                        "{ENV_PACING}: expected 'on' or 'off', got '{other}'"
                    )))
                }
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Rejects settings the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.symbols_per_invocation == 0 {
            return Err(Error::InvalidConfigValue(
                "symbols_per_invocation must be at least 1".to_string(),
            ));
        }
        if self.history_days <= 0 || self.history_days > MAX_HISTORY_DAYS {
            return Err(Error::InvalidConfigValue(format!(
                "history_days must be between 1 and {MAX_HISTORY_DAYS}"
            )));
        }
        if self.freshness_window < chrono::Duration::zero() {
            return Err(Error::InvalidConfigValue(
                "freshness_window must not be negative".to_string(),
            ));
        }
        if self.stale_run_after <= chrono::Duration::zero() {
            return Err(Error::InvalidConfigValue(
                "stale_run_after must be positive".to_string(),
            ));
        }
        if self.quote_asset.is_empty() {
            return Err(Error::MissingConfigKey(ENV_QUOTE_ASSET.to_string()));
        }
        if self.registry_batch_size == 0
            || self.candle_write_batch == 0
            || self.incremental_limit == 0
            || self.gap_limit == 0
            || self.history_page_limit == 0
        {
            return Err(Error::InvalidConfigValue(
                "batch sizes and kline limits must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Same configuration with every pacing delay removed.
    pub fn without_pacing(mut self) -> Self {
        self.pacing = Pacing::none();
        self
    }
}

fn parse<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse::<T>()
        .map_err(|_| Error::InvalidConfigValue(format!("{key}: cannot parse '{value}'")))
}

fn duration_from(
    key: &str,
    value: &str,
    build: fn(i64) -> Option<chrono::Duration>,
) -> Result<chrono::Duration> {
    build(parse(key, value)?)
        .ok_or_else(|| Error::InvalidConfigValue(format!("{key}: '{value}' is out of range")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = IngestionConfig::default();
        assert_eq!(config.popular_symbols.len(), 8);
        assert_eq!(config.popular_symbols[0], "BTCUSDT");
        assert_eq!(config.symbols_per_invocation, 1);
        assert_eq!(config.history_days, 730);
        assert_eq!(config.stale_run_after, chrono::Duration::minutes(10));
        assert_eq!(config.retry, RetryPolicy::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_lookup_overrides() {
        let config = IngestionConfig::from_lookup(lookup(&[
            (ENV_POPULAR_SYMBOLS, " btcusdt, ETHUSDT ,, "),
            (ENV_SYMBOLS_PER_RUN, "3"),
            (ENV_MAX_RETRIES, "2"),
            (ENV_INITIAL_BACKOFF_MS, "250"),
            (ENV_PACING, "off"),
        ]))
        .unwrap();

        assert_eq!(config.popular_symbols, vec!["BTCUSDT", "ETHUSDT"]);
        assert_eq!(config.symbols_per_invocation, 3);
        assert_eq!(config.retry.max_retries, 2);
        assert_eq!(config.retry.initial_backoff, Duration::from_millis(250));
        assert_eq!(config.pacing, Pacing::none());
    }

    #[test]
    fn test_blank_values_are_ignored() {
        let config = IngestionConfig::from_lookup(lookup(&[(ENV_SYMBOLS_PER_RUN, "  ")])).unwrap();
        assert_eq!(config.symbols_per_invocation, 1);
    }

    #[test]
    fn test_unparseable_value_is_rejected() {
        let err = IngestionConfig::from_lookup(lookup(&[(ENV_HISTORY_DAYS, "two years")]))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidConfigValue(_)));
    }

    #[test]
    fn test_zero_batch_size_is_rejected() {
        let err =
            IngestionConfig::from_lookup(lookup(&[(ENV_SYMBOLS_PER_RUN, "0")])).unwrap_err();
        assert!(matches!(err, Error::InvalidConfigValue(_)));
    }

    #[test]
    fn test_out_of_range_durations_are_rejected() {
        let err = IngestionConfig::from_lookup(lookup(&[(
            ENV_FRESHNESS_HOURS,
            "9223372036854775",
        )]))
        .unwrap_err();
        assert!(matches!(err, Error::InvalidConfigValue(_)));

        let err = IngestionConfig::from_lookup(lookup(&[(
            ENV_STALE_MINUTES,
            "9223372036854775807",
        )]))
        .unwrap_err();
        assert!(matches!(err, Error::InvalidConfigValue(_)));
    }

    #[test]
    fn test_history_days_upper_bound() {
        let err = IngestionConfig::from_lookup(lookup(&[(ENV_HISTORY_DAYS, "200000000000")]))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidConfigValue(_)));

        let config =
            IngestionConfig::from_lookup(lookup(&[(ENV_HISTORY_DAYS, "36500")])).unwrap();
        assert_eq!(config.history_days, MAX_HISTORY_DAYS);
    }

    #[test]
    fn test_unknown_pacing_mode_is_rejected() {
        assert!(IngestionConfig::from_lookup(lookup(&[(ENV_PACING, "slow")])).is_err());
    }
}
