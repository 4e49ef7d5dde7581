//! Process-level configuration read from the environment.

use std::time::Duration;

use seasonality_core::IngestionConfig;
use seasonality_market_data::DEFAULT_BASE_URL;

pub const ENV_DB_PATH: &str = "SEASONALITY_DB_PATH";
pub const ENV_EXCHANGE_URL: &str = "SEASONALITY_EXCHANGE_URL";
pub const ENV_WATCH_INTERVAL_SECS: &str = "SEASONALITY_WATCH_INTERVAL_SECS";

const DEFAULT_DB_PATH: &str = "./data/seasonality.db";
const DEFAULT_WATCH_INTERVAL_SECS: u64 = 300;

#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: String,
    pub exchange_url: String,
    pub watch_interval: Duration,
    pub ingestion: IngestionConfig,
}

impl Config {
    /// Loads `.env` if present, then reads the environment.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let db_path = get(ENV_DB_PATH)
            .or_else(|| get("DATABASE_URL"))
            .unwrap_or_else(|| DEFAULT_DB_PATH.to_string());
        let exchange_url = get(ENV_EXCHANGE_URL)
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let watch_secs = match get(ENV_WATCH_INTERVAL_SECS) {
            Some(v) => v.trim().parse::<u64>().map_err(|_| {
                anyhow::anyhow!("{ENV_WATCH_INTERVAL_SECS}: cannot parse '{v}'")
            })?,
            None => DEFAULT_WATCH_INTERVAL_SECS,
        };

        Ok(Self {
            db_path,
            exchange_url,
            watch_interval: Duration::from_secs(watch_secs.max(1)),
            ingestion: IngestionConfig::from_lookup(&lookup)?,
        })
    }
}
