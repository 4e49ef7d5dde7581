use std::sync::Arc;

use seasonality_core::{IngestionService, IngestionServiceTrait};
use seasonality_market_data::{BinanceClient, ExchangeClient, FetchClient, TokioSleeper};
use seasonality_storage_sqlite::{
    db, CandleRepository, ProcessingStateRepository, SymbolRepository,
};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Config;

pub const ENV_LOG_FORMAT: &str = "SEASONALITY_LOG_FORMAT";

pub type SqliteIngestionService =
    IngestionService<SymbolRepository, CandleRepository, ProcessingStateRepository>;

pub struct AppState {
    pub ingestion_service: Arc<dyn IngestionServiceTrait>,
}

pub fn init_tracing() {
    let log_format = std::env::var(ENV_LOG_FORMAT).unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let (pool, writer) = db::open(&config.db_path)?;
    tracing::info!("Database path in use: {}", config.db_path);

    let symbol_repo = Arc::new(SymbolRepository::new(pool.clone(), writer.clone()));
    let candle_repo = Arc::new(CandleRepository::new(pool.clone(), writer.clone()));
    let processing_repo = Arc::new(ProcessingStateRepository::new(pool, writer));

    let exchange: Arc<dyn ExchangeClient> = Arc::new(BinanceClient::new(
        config.exchange_url.clone(),
        FetchClient::with_defaults(),
        config.ingestion.retry,
    ));
    tracing::info!("Exchange endpoint: {}", config.exchange_url);

    let service: SqliteIngestionService = IngestionService::new(
        symbol_repo,
        candle_repo,
        processing_repo,
        exchange,
        Arc::new(TokioSleeper),
        config.ingestion.clone(),
    );

    Ok(Arc::new(AppState {
        ingestion_service: Arc::new(service),
    }))
}
