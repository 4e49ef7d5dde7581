//! Ingestion orchestrator.
//!
//! Drives one invocation through the run state machine:
//!
//! ```text
//! Idle → ClaimingRun → FetchingUniverse → UpdatingRegistry → CheckingBootstrap
//!      → SelectingSymbols → ProcessingSymbol (×N) → Done | Paused
//! ```
//!
//! Only a bounded number of symbols is processed per invocation. The position
//! is persisted after every symbol, so the next invocation resumes where this
//! one stopped.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};
use std::sync::Arc;

use seasonality_market_data::{ExchangeClient, Instrument, Kline, Sleeper};

use super::report::{RunPhase, SliceOutcome, SliceReport, SymbolReport, SymbolStatus, SymbolWork};
use super::traits::IngestionServiceTrait;
use crate::candles::{
    CandleStore, DailyCandle, GapDetector, MonthlyAggregator, MonthlyCandle, SeasonalitySummary,
};
use crate::config::IngestionConfig;
use crate::constants::DAY_MS;
use crate::errors::{Error, Result};
use crate::processing::{ClaimOutcome, ProcessingState, ProcessingStateStore, ProcessingStatus, ProgressTracker};
use crate::symbols::{NewSymbol, SymbolStore};
use crate::utils::{datetime_from_millis, with_store_cooldown};

/// The ingestion engine.
///
/// Generic over its three stores; the exchange and the sleeper are trait
/// objects so tests can script them.
pub struct IngestionService<S, C, P>
where
    S: SymbolStore,
    C: CandleStore,
    P: ProcessingStateStore,
{
    symbol_store: Arc<S>,
    candle_store: Arc<C>,
    tracker: ProgressTracker<P>,
    gap_detector: GapDetector<C>,
    aggregator: MonthlyAggregator<C>,
    exchange: Arc<dyn ExchangeClient>,
    sleeper: Arc<dyn Sleeper>,
    config: IngestionConfig,
}

impl<S, C, P> IngestionService<S, C, P>
where
    S: SymbolStore + 'static,
    C: CandleStore + 'static,
    P: ProcessingStateStore + 'static,
{
    pub fn new(
        symbol_store: Arc<S>,
        candle_store: Arc<C>,
        processing_store: Arc<P>,
        exchange: Arc<dyn ExchangeClient>,
        sleeper: Arc<dyn Sleeper>,
        config: IngestionConfig,
    ) -> Self {
        let tracker = ProgressTracker::new(processing_store, config.stale_run_after);
        let gap_detector = GapDetector::new(candle_store.clone(), config.retry, sleeper.clone());
        let aggregator = MonthlyAggregator::new(candle_store.clone(), config.retry, sleeper.clone());

        Self {
            symbol_store,
            candle_store,
            tracker,
            gap_detector,
            aggregator,
            exchange,
            sleeper,
            config,
        }
    }

    pub fn config(&self) -> &IngestionConfig {
        &self.config
    }

    // =========================================================================
    // Run
    // =========================================================================

    async fn run_claimed(&self, mut state: ProcessingState) -> Result<SliceReport> {
        debug!("Phase: {}", RunPhase::FetchingUniverse);
        let universe = self
            .fetch_universe()
            .await
            .map_err(|e| Error::run_aborted(RunPhase::FetchingUniverse, e))?;
        info!(
            "{} lists {} {}-quoted trading instruments",
            self.exchange.id(),
            universe.len(),
            self.config.quote_asset
        );

        debug!("Phase: {}", RunPhase::UpdatingRegistry);
        self.update_registry(&universe).await;

        debug!("Phase: {}", RunPhase::CheckingBootstrap);
        let store = &self.candle_store;
        let existing = with_store_cooldown(&self.config.retry, self.sleeper.as_ref(), "bootstrap check", || async move {
            store.count_daily_candles()
        })
        .await
        .map_err(|e| Error::run_aborted(RunPhase::CheckingBootstrap, e))?;
        let is_bootstrap = existing == 0;

        debug!("Phase: {}", RunPhase::SelectingSymbols);
        let working = self.select_symbols(&universe, is_bootstrap);
        let total = working.len();
        let start = state.resume_index(total);
        let end = start
            .saturating_add(self.config.symbols_per_invocation)
            .min(total);
        state.begin_slice(total, Utc::now());
        state = self.save_state(&state).await?;

        if is_bootstrap {
            info!(
                "Initial setup: processing {} popular symbols first",
                total
            );
        }
        info!(
            "Processing symbols {}..{} of {} ({} mode)",
            start,
            end,
            total,
            if is_bootstrap { "bootstrap" } else { "incremental" }
        );

        let mut report = SliceReport::new(is_bootstrap, total);

        for (index, symbol) in working.iter().enumerate().take(end).skip(start) {
            if index > start {
                self.sleeper.sleep(self.config.pacing.between_symbols).await;
            }
            debug!("Phase: {} {} ({}/{})", RunPhase::ProcessingSymbol, symbol, index + 1, total);

            let symbol_report = match self.process_symbol(symbol, is_bootstrap).await {
                Ok(work) => {
                    let status = if work.skipped {
                        info!("{}: up to date, skipped", symbol);
                        SymbolStatus::Skipped
                    } else {
                        info!(
                            "{}: stored {} candles, rebuilt {} months",
                            symbol, work.candles_stored, work.months_written
                        );
                        SymbolStatus::Success
                    };
                    SymbolReport {
                        symbol: symbol.clone(),
                        index,
                        status,
                        work,
                        error: None,
                    }
                }
                Err(e) => {
                    error!("{}: processing failed: {}", symbol, e);
                    SymbolReport {
                        symbol: symbol.clone(),
                        index,
                        status: SymbolStatus::Failed,
                        work: SymbolWork::default(),
                        error: Some(e.to_string()),
                    }
                }
            };
            report.add(symbol_report);

            state.record_progress(symbol, index, Utc::now());
            state = self.save_state(&state).await?;
        }

        if end >= total {
            debug!("Phase: {}", RunPhase::Done);
            report.percent_complete = 100;
            report.outcome = SliceOutcome::Completed;
            state.complete(Utc::now());
        } else {
            debug!("Phase: {}", RunPhase::Paused);
            report.percent_complete = state.percent_complete();
            report.outcome = SliceOutcome::Paused { next_index: end };
            state.release(Utc::now());
        }
        self.save_state(&state).await?;

        info!("{}", report.summary());
        Ok(report)
    }

    async fn fetch_universe(&self) -> Result<Vec<Instrument>> {
        let instruments = self.exchange.list_instruments().await?;
        Ok(instruments
            .into_iter()
            .filter(|i| i.is_tradable_with_quote(&self.config.quote_asset))
            .collect())
    }

    /// Upserts the universe in small batches. A failed batch is retried item
    /// by item; failures are logged and never abort the run.
    async fn update_registry(&self, universe: &[Instrument]) -> usize {
        let pacing = self.config.pacing;
        let batch_size = self.config.registry_batch_size.max(1);
        let batch_count = universe.len().div_ceil(batch_size);
        let mut written = 0;

        for (batch_index, batch) in universe.chunks(batch_size).enumerate() {
            let rows: Vec<NewSymbol> = batch.iter().map(NewSymbol::from).collect();

            match self.symbol_store.upsert_symbols(&rows).await {
                Ok(count) => written += count,
                Err(e) => {
                    warn!(
                        "Registry batch {}/{} failed ({}), retrying item by item",
                        batch_index + 1,
                        batch_count,
                        e
                    );
                    for (i, row) in rows.iter().enumerate() {
                        if i > 0 {
                            self.sleeper.sleep(pacing.between_registry_items).await;
                        }
                        match self.symbol_store.upsert_symbols(std::slice::from_ref(row)).await {
                            Ok(count) => written += count,
                            Err(e) => warn!("Skipping symbol {}: {}", row.symbol, e),
                        }
                    }
                }
            }

            if batch_index + 1 < batch_count {
                self.sleeper.sleep(pacing.between_registry_batches).await;
            }
        }

        debug!("Registry updated: {}/{} symbols written", written, universe.len());
        written
    }

    /// Working list: the popular allowlist while bootstrapping, else the
    /// whole universe. Universe order is kept so indexes stay stable.
    fn select_symbols(&self, universe: &[Instrument], is_bootstrap: bool) -> Vec<String> {
        universe
            .iter()
            .filter(|i| !is_bootstrap || self.config.popular_symbols.contains(&i.symbol))
            .map(|i| i.symbol.clone())
            .collect()
    }

    async fn save_state(&self, state: &ProcessingState) -> Result<ProcessingState> {
        let tracker = &self.tracker;
        with_store_cooldown(&self.config.retry, self.sleeper.as_ref(), "processing state", move || {
            tracker.save(state)
        })
        .await
    }

    // =========================================================================
    // Per-symbol step
    // =========================================================================

    /// Brings one symbol up to date and rebuilds its monthly candles.
    ///
    /// - no stored candles, or bootstrap: fetch the full history
    /// - latest candle within the freshness window: skip
    /// - otherwise: backfill detected gaps, or fetch the small window after
    ///   the latest candle when none are found
    pub async fn process_symbol(&self, symbol: &str, is_bootstrap: bool) -> Result<SymbolWork> {
        let now_ms = Utc::now().timestamp_millis();
        let history_start =
            now_ms.saturating_sub(self.config.history_days.saturating_mul(DAY_MS));
        let label = format!("latest candle for {symbol}");

        let store = &self.candle_store;
        let latest = with_store_cooldown(&self.config.retry, self.sleeper.as_ref(), &label, || async move {
            store.latest_daily_timestamp(symbol)
        })
        .await?;

        let mut work = SymbolWork::default();

        match latest {
            Some(last) if !is_bootstrap => {
                if is_fresh(now_ms, last, self.config.freshness_window) {
                    return Ok(SymbolWork::skipped());
                }

                let gaps = self
                    .gap_detector
                    .find_gaps(symbol, history_start.max(last), now_ms)
                    .await;

                if gaps.is_empty() {
                    let klines = self
                        .exchange
                        .daily_klines(symbol, last + 1, now_ms, self.config.incremental_limit)
                        .await?;
                    work.candles_stored += self.store_klines(symbol, &klines).await?;
                } else {
                    debug!("{}: backfilling {} gaps", symbol, gaps.len());
                    for gap in &gaps {
                        let klines = self
                            .exchange
                            .daily_klines_paged(symbol, gap.start, gap.end, self.config.gap_limit)
                            .await?;
                        work.candles_stored += self.store_klines(symbol, &klines).await?;
                    }
                    work.gaps_filled = gaps.len();
                }
            }
            _ => {
                debug!("{}: fetching {} days of history", symbol, self.config.history_days);
                let klines = self
                    .exchange
                    .daily_klines_paged(symbol, history_start, now_ms, self.config.history_page_limit)
                    .await?;
                work.full_history = true;
                work.candles_stored += self.store_klines(symbol, &klines).await?;
            }
        }

        let rebuild = self.aggregator.rebuild_monthly(symbol).await?;
        if !rebuild.is_complete() {
            warn!(
                "{}: {} monthly candles could not be written",
                symbol,
                rebuild.failed.len()
            );
        }
        work.months_written = rebuild.written;
        work.months_failed = rebuild.failed.len();

        Ok(work)
    }

    async fn store_klines(&self, symbol: &str, klines: &[Kline]) -> Result<usize> {
        let candles: Vec<DailyCandle> = klines
            .iter()
            .map(|k| DailyCandle::from_kline(symbol, k))
            .collect();
        let label = format!("daily candles for {symbol}");
        let store = &self.candle_store;
        let mut stored = 0;

        for chunk in candles.chunks(self.config.candle_write_batch.max(1)) {
            stored += with_store_cooldown(&self.config.retry, self.sleeper.as_ref(), &label, move || {
                store.upsert_daily_candles(chunk)
            })
            .await?;
        }

        Ok(stored)
    }
}

/// A symbol whose latest candle is at most `window` old needs no fetch.
pub(crate) fn is_fresh(now_ms: i64, last_ms: i64, window: chrono::Duration) -> bool {
    now_ms.saturating_sub(last_ms) <= window.num_milliseconds()
}

#[async_trait]
impl<S, C, P> IngestionServiceTrait for IngestionService<S, C, P>
where
    S: SymbolStore + 'static,
    C: CandleStore + 'static,
    P: ProcessingStateStore + 'static,
{
    async fn run_ingestion_slice(&self) -> Result<SliceReport> {
        debug!("Phase: {}", RunPhase::ClaimingRun);
        let state = match self.tracker.claim(Utc::now()).await? {
            ClaimOutcome::AlreadyRunning(state) => {
                return Ok(SliceReport::already_running(&state));
            }
            ClaimOutcome::Claimed { state, .. } => state,
        };

        match self.run_claimed(state).await {
            Ok(report) => Ok(report),
            Err(e) => {
                error!("Ingestion run failed: {}", e);
                self.tracker.release_after_failure(Utc::now()).await;
                Err(e)
            }
        }
    }

    fn get_processing_status(&self) -> Result<ProcessingStatus> {
        self.tracker.status(Utc::now())
    }

    fn get_symbol_status(&self, symbol: &str) -> Result<Option<DateTime<Utc>>> {
        self.candle_store
            .latest_daily_timestamp(symbol)?
            .map(datetime_from_millis)
            .transpose()
    }

    fn list_active_symbols(&self) -> Result<Vec<String>> {
        self.symbol_store.list_active_symbols()
    }

    fn get_monthly_history(&self, symbol: &str) -> Result<Vec<MonthlyCandle>> {
        self.candle_store.monthly_history(symbol)
    }

    fn get_seasonality(&self, symbol: &str) -> Result<SeasonalitySummary> {
        let history = self.candle_store.monthly_history(symbol)?;
        Ok(SeasonalitySummary::from_history(&history))
    }

    fn ping(&self) -> Result<()> {
        self.tracker.ping()
    }
}
