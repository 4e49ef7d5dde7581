//! Tests for the ingestion orchestrator.
//!
//! The service runs against in-memory stores and a synthetic exchange that
//! serves one candle per UTC midnight. Contract points:
//!
//! 1. Resume: a run starts right after the persisted index
//! 2. Claim: a fresh run is refused, a stale one is taken over
//! 3. Bootstrap: an empty store processes the popular symbols first
//! 4. Per-symbol errors are counted and never stop the slice
//! 5. Fatal precondition failures release the claim

#[cfg(test)]
mod tests {
    use crate::candles::{month_return, CandleStore, DailyCandle, MonthlyCandle};
    use crate::config::IngestionConfig;
    use crate::constants::DAY_MS;
    use crate::errors::{DatabaseError, Error, Result};
    use crate::ingestion::service::is_fresh;
    use crate::ingestion::{
        IngestionService, IngestionServiceTrait, RunPhase, SliceOutcome, SymbolStatus,
    };
    use crate::processing::{ClaimOutcome, ProcessingState, ProcessingStateStore};
    use crate::symbols::{NewSymbol, Symbol, SymbolStore};
    use async_trait::async_trait;
    use chrono::{DateTime, Duration, Utc};
    use rust_decimal::Decimal;
    use seasonality_market_data::{
        ExchangeClient, Instrument, Kline, MarketDataError, RecordingSleeper,
    };
    use std::collections::{BTreeMap, HashSet};
    use std::sync::{Arc, Mutex};

    // =========================================================================
    // Mock SymbolStore
    // =========================================================================

    #[derive(Default)]
    struct MockSymbolStore {
        symbols: Mutex<BTreeMap<String, NewSymbol>>,
        /// Batches larger than this fail as a whole.
        max_batch: Mutex<Option<usize>>,
    }

    impl MockSymbolStore {
        fn fail_batches_over(&self, size: usize) {
            *self.max_batch.lock().unwrap() = Some(size);
        }

        fn names(&self) -> Vec<String> {
            self.symbols.lock().unwrap().keys().cloned().collect()
        }
    }

    #[async_trait]
    impl SymbolStore for MockSymbolStore {
        async fn upsert_symbols(&self, symbols: &[NewSymbol]) -> Result<usize> {
            if let Some(max) = *self.max_batch.lock().unwrap() {
                if symbols.len() > max {
                    return Err(Error::Database(DatabaseError::QueryFailed(
                        "batch too large".into(),
                    )));
                }
            }
            let mut stored = self.symbols.lock().unwrap();
            for symbol in symbols {
                stored.insert(symbol.symbol.clone(), symbol.clone());
            }
            Ok(symbols.len())
        }

        fn list_active_symbols(&self) -> Result<Vec<String>> {
            Ok(self
                .symbols
                .lock()
                .unwrap()
                .values()
                .filter(|s| s.is_active)
                .map(|s| s.symbol.clone())
                .collect())
        }

        fn get_symbol(&self, symbol: &str) -> Result<Option<Symbol>> {
            let now = Utc::now();
            Ok(self.symbols.lock().unwrap().get(symbol).map(|s| Symbol {
                symbol: s.symbol.clone(),
                base_asset: s.base_asset.clone(),
                quote_asset: s.quote_asset.clone(),
                is_active: s.is_active,
                created_at: now,
                updated_at: now,
            }))
        }
    }

    // =========================================================================
    // Mock CandleStore
    // =========================================================================

    #[derive(Default)]
    struct MockCandleStore {
        daily: Mutex<BTreeMap<(String, i64), DailyCandle>>,
        monthly: Mutex<BTreeMap<(String, i32, u32), MonthlyCandle>>,
        /// Makes `count_daily_candles` fail.
        count_broken: Mutex<bool>,
    }

    impl MockCandleStore {
        fn break_count(self) -> Self {
            *self.count_broken.lock().unwrap() = true;
            self
        }

        fn seed_days(&self, symbol: &str, days: impl IntoIterator<Item = i64>) {
            let mut daily = self.daily.lock().unwrap();
            for day in days {
                let kline = synthetic_kline(day);
                daily.insert(
                    (symbol.to_string(), day),
                    DailyCandle::from_kline(symbol, &kline),
                );
            }
        }

        fn days_for(&self, symbol: &str) -> Vec<i64> {
            self.daily
                .lock()
                .unwrap()
                .keys()
                .filter(|(s, _)| s == symbol)
                .map(|(_, ts)| *ts)
                .collect()
        }
    }

    #[async_trait]
    impl CandleStore for MockCandleStore {
        async fn upsert_daily_candles(&self, candles: &[DailyCandle]) -> Result<usize> {
            let mut daily = self.daily.lock().unwrap();
            for candle in candles {
                daily.insert((candle.symbol.clone(), candle.timestamp), candle.clone());
            }
            Ok(candles.len())
        }

        fn daily_timestamps_in_range(
            &self,
            symbol: &str,
            start_ms: i64,
            end_ms: i64,
        ) -> Result<Vec<i64>> {
            Ok(self
                .days_for(symbol)
                .into_iter()
                .filter(|ts| *ts >= start_ms && *ts <= end_ms)
                .collect())
        }

        fn daily_candles(&self, symbol: &str) -> Result<Vec<DailyCandle>> {
            Ok(self
                .daily
                .lock()
                .unwrap()
                .values()
                .filter(|c| c.symbol == symbol)
                .cloned()
                .collect())
        }

        fn latest_daily_timestamp(&self, symbol: &str) -> Result<Option<i64>> {
            Ok(self.days_for(symbol).last().copied())
        }

        fn count_daily_candles(&self) -> Result<i64> {
            if *self.count_broken.lock().unwrap() {
                return Err(Error::Database(DatabaseError::QueryFailed(
                    "no such table: daily_candles".into(),
                )));
            }
            Ok(self.daily.lock().unwrap().len() as i64)
        }

        async fn upsert_monthly_candle(&self, candle: &MonthlyCandle) -> Result<MonthlyCandle> {
            self.monthly.lock().unwrap().insert(
                (candle.symbol.clone(), candle.year, candle.month),
                candle.clone(),
            );
            Ok(candle.clone())
        }

        fn get_monthly_candle(
            &self,
            symbol: &str,
            year: i32,
            month: u32,
        ) -> Result<Option<MonthlyCandle>> {
            Ok(self
                .monthly
                .lock()
                .unwrap()
                .get(&(symbol.to_string(), year, month))
                .cloned())
        }

        fn monthly_history(&self, symbol: &str) -> Result<Vec<MonthlyCandle>> {
            Ok(self
                .monthly
                .lock()
                .unwrap()
                .values()
                .filter(|m| m.symbol == symbol)
                .cloned()
                .collect())
        }
    }

    // =========================================================================
    // Mock ProcessingStateStore
    // =========================================================================

    #[derive(Default)]
    struct MockProcessingStore {
        state: Mutex<Option<ProcessingState>>,
    }

    impl MockProcessingStore {
        fn with_state(state: ProcessingState) -> Self {
            Self {
                state: Mutex::new(Some(state)),
            }
        }

        fn current(&self) -> ProcessingState {
            self.state.lock().unwrap().clone().unwrap()
        }
    }

    #[async_trait]
    impl ProcessingStateStore for MockProcessingStore {
        fn load(&self) -> Result<Option<ProcessingState>> {
            Ok(self.state.lock().unwrap().clone())
        }

        async fn load_or_init(&self) -> Result<ProcessingState> {
            let mut state = self.state.lock().unwrap();
            Ok(state
                .get_or_insert_with(|| ProcessingState::new(1, Utc::now()))
                .clone())
        }

        async fn save(&self, state: &ProcessingState) -> Result<ProcessingState> {
            *self.state.lock().unwrap() = Some(state.clone());
            Ok(state.clone())
        }

        async fn try_claim(&self, now: DateTime<Utc>, stale_after: Duration) -> Result<ClaimOutcome> {
            let mut guard = self.state.lock().unwrap();
            let current = guard
                .clone()
                .unwrap_or_else(|| ProcessingState::new(1, now));
            let outcome = current.try_claim(now, stale_after);
            if let ClaimOutcome::Claimed { state, .. } = &outcome {
                *guard = Some(state.clone());
            }
            Ok(outcome)
        }

        fn ping(&self) -> Result<()> {
            Ok(())
        }
    }

    // =========================================================================
    // Mock ExchangeClient
    // =========================================================================

    /// Deterministic close for the candle opening at `day_ms`.
    fn synthetic_kline(day_ms: i64) -> Kline {
        let day = day_ms / DAY_MS;
        let close = Decimal::from(100 + day % 97);
        Kline {
            open_time: day_ms,
            open: close - Decimal::ONE,
            high: close + Decimal::ONE,
            low: close - Decimal::TWO,
            close,
            volume: Decimal::from(10 + day % 7),
            close_time: day_ms + DAY_MS - 1,
        }
    }

    #[derive(Default)]
    struct MockExchange {
        instruments: Vec<Instrument>,
        fail_universe: bool,
        failing_symbols: HashSet<String>,
        /// (symbol, start, end, limit) of every kline request
        kline_calls: Mutex<Vec<(String, i64, i64, u32)>>,
        universe_calls: Mutex<usize>,
    }

    impl MockExchange {
        fn with_symbols(symbols: &[&str]) -> Self {
            Self {
                instruments: symbols.iter().map(|s| instrument(s, "USDT", "TRADING")).collect(),
                ..Self::default()
            }
        }

        fn kline_calls(&self) -> Vec<(String, i64, i64, u32)> {
            self.kline_calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ExchangeClient for MockExchange {
        fn id(&self) -> &'static str {
            "MOCK"
        }

        async fn list_instruments(&self) -> std::result::Result<Vec<Instrument>, MarketDataError> {
            *self.universe_calls.lock().unwrap() += 1;
            if self.fail_universe {
                return Err(MarketDataError::RateLimited {
                    url: "/api/v3/exchangeInfo".into(),
                    retry_after: None,
                });
            }
            Ok(self.instruments.clone())
        }

        async fn daily_klines(
            &self,
            symbol: &str,
            start_ms: i64,
            end_ms: i64,
            limit: u32,
        ) -> std::result::Result<Vec<Kline>, MarketDataError> {
            self.kline_calls
                .lock()
                .unwrap()
                .push((symbol.to_string(), start_ms, end_ms, limit));
            if self.failing_symbols.contains(symbol) {
                return Err(MarketDataError::Transport("connection reset".into()));
            }

            let first_day = start_ms.div_euclid(DAY_MS) * DAY_MS;
            let first_day = if first_day < start_ms {
                first_day + DAY_MS
            } else {
                first_day
            };
            Ok((0..)
                .map(|i| first_day + i * DAY_MS)
                .take_while(|day| *day <= end_ms)
                .take(limit as usize)
                .map(synthetic_kline)
                .collect())
        }
    }

    fn instrument(symbol: &str, quote: &str, status: &str) -> Instrument {
        Instrument {
            symbol: symbol.to_string(),
            base_asset: symbol.trim_end_matches(quote).to_string(),
            quote_asset: quote.to_string(),
            status: status.to_string(),
        }
    }

    // =========================================================================
    // Harness
    // =========================================================================

    type TestService = IngestionService<MockSymbolStore, MockCandleStore, MockProcessingStore>;

    struct Harness {
        service: TestService,
        symbols: Arc<MockSymbolStore>,
        candles: Arc<MockCandleStore>,
        processing: Arc<MockProcessingStore>,
        exchange: Arc<MockExchange>,
    }

    fn test_config() -> IngestionConfig {
        IngestionConfig {
            history_days: 90,
            ..IngestionConfig::default().without_pacing()
        }
    }

    fn harness(
        exchange: MockExchange,
        candles: MockCandleStore,
        processing: MockProcessingStore,
        config: IngestionConfig,
    ) -> Harness {
        let symbols = Arc::new(MockSymbolStore::default());
        let candles = Arc::new(candles);
        let processing = Arc::new(processing);
        let exchange = Arc::new(exchange);
        let service = IngestionService::new(
            symbols.clone(),
            candles.clone(),
            processing.clone(),
            exchange.clone(),
            Arc::new(RecordingSleeper::new()),
            config,
        );
        Harness {
            service,
            symbols,
            candles,
            processing,
            exchange,
        }
    }

    fn today_midnight() -> i64 {
        Utc::now().timestamp_millis().div_euclid(DAY_MS) * DAY_MS
    }

    /// Store with one unrelated candle, so runs are not bootstrap runs.
    fn non_empty_store() -> MockCandleStore {
        let store = MockCandleStore::default();
        store.seed_days("SEEDUSDT", [today_midnight() - 400 * DAY_MS]);
        store
    }

    fn idle_state_at(last_index: i64, total: i64) -> ProcessingState {
        let mut state = ProcessingState::new(1, Utc::now() - Duration::hours(1));
        state.last_processed_index = last_index;
        state.total_symbols = total;
        state
    }

    fn ten_symbols() -> Vec<String> {
        (0..10).map(|i| format!("S{i}USDT")).collect()
    }

    // =========================================================================
    // Resume and claim
    // =========================================================================

    #[tokio::test]
    async fn test_resumes_after_last_processed_index() {
        let names = ten_symbols();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let h = harness(
            MockExchange::with_symbols(&refs),
            non_empty_store(),
            MockProcessingStore::with_state(idle_state_at(4, 10)),
            test_config(),
        );

        let report = h.service.run_ingestion_slice().await.unwrap();

        assert!(!report.is_bootstrap);
        assert_eq!(report.total_symbols, 10);
        assert_eq!(report.processed_count, 1);
        assert_eq!(report.symbols[0].index, 5);
        assert_eq!(report.symbols[0].symbol, "S5USDT");
        assert_eq!(report.outcome, SliceOutcome::Paused { next_index: 6 });
        assert_eq!(report.percent_complete, 60);

        let state = h.processing.current();
        assert_eq!(state.last_processed_index, 5);
        assert_eq!(state.last_processed_symbol.as_deref(), Some("S5USDT"));
        assert!(!state.is_processing);
    }

    #[tokio::test]
    async fn test_stale_run_is_taken_over() {
        let names = ten_symbols();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let mut stale = idle_state_at(2, 10);
        stale.is_processing = true;
        stale.started_at = Some(Utc::now() - Duration::minutes(15));

        let h = harness(
            MockExchange::with_symbols(&refs),
            non_empty_store(),
            MockProcessingStore::with_state(stale),
            test_config(),
        );

        let report = h.service.run_ingestion_slice().await.unwrap();

        assert_eq!(report.symbols[0].index, 3);
        assert!(!h.processing.current().is_processing);
    }

    #[tokio::test]
    async fn test_fresh_run_in_progress_is_left_alone() {
        let mut running = idle_state_at(2, 10);
        running.is_processing = true;
        running.started_at = Some(Utc::now() - Duration::minutes(2));

        let h = harness(
            MockExchange::with_symbols(&["BTCUSDT"]),
            non_empty_store(),
            MockProcessingStore::with_state(running.clone()),
            test_config(),
        );

        let report = h.service.run_ingestion_slice().await.unwrap();

        assert!(report.is_already_running());
        assert_eq!(report.processed_count, 0);
        assert_eq!(*h.exchange.universe_calls.lock().unwrap(), 0);
        assert_eq!(h.processing.current(), running);
    }

    #[tokio::test]
    async fn test_reaching_the_end_resets_the_index() {
        let h = harness(
            MockExchange::with_symbols(&["AAAUSDT", "BBBUSDT"]),
            non_empty_store(),
            MockProcessingStore::with_state(idle_state_at(0, 2)),
            test_config(),
        );

        let report = h.service.run_ingestion_slice().await.unwrap();

        assert_eq!(report.symbols[0].symbol, "BBBUSDT");
        assert_eq!(report.outcome, SliceOutcome::Completed);
        assert_eq!(report.percent_complete, 100);

        let state = h.processing.current();
        assert_eq!(state.last_processed_index, -1);
        assert_eq!(state.last_processed_symbol.as_deref(), Some("BBBUSDT"));
        assert!(!state.is_processing);
    }

    // =========================================================================
    // Bootstrap
    // =========================================================================

    #[tokio::test]
    async fn test_bootstrap_processes_popular_symbols_in_universe_order() {
        let h = harness(
            MockExchange::with_symbols(&["AAAUSDT", "ETHUSDT", "ZZZUSDT", "BTCUSDT"]),
            MockCandleStore::default(),
            MockProcessingStore::default(),
            test_config(),
        );

        let report = h.service.run_ingestion_slice().await.unwrap();

        assert!(report.is_bootstrap);
        assert_eq!(report.total_symbols, 2);
        assert_eq!(report.symbols[0].symbol, "ETHUSDT");
        assert!(report.symbols[0].work.full_history);
        assert_eq!(report.outcome, SliceOutcome::Paused { next_index: 1 });

        // The store is no longer empty, so the next slice indexes into the
        // full universe with the position saved against the bootstrap list.
        let report = h.service.run_ingestion_slice().await.unwrap();

        assert!(!report.is_bootstrap);
        assert_eq!(report.total_symbols, 4);
        assert_eq!(report.symbols[0].index, 1);
        assert_eq!(report.symbols[0].symbol, "ETHUSDT");
        assert_eq!(report.symbols[0].status, SymbolStatus::Skipped);
    }

    #[tokio::test]
    async fn test_registry_skips_non_trading_and_other_quotes() {
        let mut exchange = MockExchange::with_symbols(&["BTCUSDT", "ETHUSDT"]);
        exchange.instruments.push(instrument("ETHBTC", "BTC", "TRADING"));
        exchange.instruments.push(instrument("LUNAUSDT", "USDT", "BREAK"));

        let h = harness(
            exchange,
            non_empty_store(),
            MockProcessingStore::default(),
            test_config(),
        );
        h.service.run_ingestion_slice().await.unwrap();

        assert_eq!(h.symbols.names(), vec!["BTCUSDT", "ETHUSDT"]);
        assert_eq!(
            h.service.list_active_symbols().unwrap(),
            vec!["BTCUSDT", "ETHUSDT"]
        );
    }

    #[tokio::test]
    async fn test_failed_registry_batch_falls_back_to_single_items() {
        let names: Vec<String> = (0..7).map(|i| format!("R{i}USDT")).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let h = harness(
            MockExchange::with_symbols(&refs),
            non_empty_store(),
            MockProcessingStore::default(),
            test_config(),
        );
        h.symbols.fail_batches_over(1);

        let report = h.service.run_ingestion_slice().await.unwrap();

        assert_eq!(h.symbols.names().len(), 7);
        assert_eq!(report.processed_count, 1);
    }

    // =========================================================================
    // Per-symbol step
    // =========================================================================

    #[tokio::test]
    async fn test_full_history_builds_chained_monthly_returns() {
        let h = harness(
            MockExchange::with_symbols(&["BTCUSDT"]),
            MockCandleStore::default(),
            MockProcessingStore::default(),
            IngestionConfig::default().without_pacing(),
        );

        let report = h.service.run_ingestion_slice().await.unwrap();
        assert_eq!(report.success_count, 1);
        assert_eq!(report.outcome, SliceOutcome::Completed);

        let stored = h.candles.days_for("BTCUSDT").len();
        assert!((730..=731).contains(&stored), "stored {stored} candles");
        assert_eq!(report.symbols[0].work.candles_stored, stored);

        let history = h.service.get_monthly_history("BTCUSDT").unwrap();
        assert!(history.len() >= 24);
        assert_eq!(history[0].return_pct, None);
        for pair in history.windows(2) {
            assert!((pair[0].year, pair[0].month) < (pair[1].year, pair[1].month));
            assert_eq!(
                pair[1].return_pct,
                month_return(pair[1].close, Some(pair[0].close))
            );
        }

        let seasonality = h.service.get_seasonality("BTCUSDT").unwrap();
        assert_eq!(seasonality.monthly_returns.len(), 12);
        let counted: usize = seasonality.monthly_returns.iter().map(|m| m.count).sum();
        assert_eq!(counted, history.len() - 1);
    }

    #[tokio::test]
    async fn test_fresh_symbol_is_skipped_without_fetching() {
        let candles = MockCandleStore::default();
        candles.seed_days("BTCUSDT", [today_midnight() - DAY_MS, today_midnight()]);
        let h = harness(
            MockExchange::with_symbols(&["BTCUSDT"]),
            candles,
            MockProcessingStore::default(),
            test_config(),
        );

        let report = h.service.run_ingestion_slice().await.unwrap();

        assert_eq!(report.skipped_count, 1);
        assert!(report.symbols[0].work.skipped);
        assert!(h.exchange.kline_calls().is_empty());
        assert!(h.service.get_monthly_history("BTCUSDT").unwrap().is_empty());
    }

    #[test]
    fn test_freshness_window_is_inclusive() {
        let window = Duration::hours(48);
        let last = today_midnight();

        assert!(is_fresh(last + 48 * 3_600_000, last, window));
        assert!(is_fresh(last + 1, last, window));
        assert!(!is_fresh(last + 48 * 3_600_000 + 1, last, window));
    }

    #[tokio::test]
    async fn test_trailing_gap_is_backfilled() {
        let today = today_midnight();
        let candles = MockCandleStore::default();
        candles.seed_days("BTCUSDT", (5..=20).map(|d| today - d * DAY_MS));
        let h = harness(
            MockExchange::with_symbols(&["BTCUSDT"]),
            candles,
            MockProcessingStore::default(),
            test_config(),
        );

        let report = h.service.run_ingestion_slice().await.unwrap();
        let work = &report.symbols[0].work;

        assert_eq!(report.symbols[0].status, SymbolStatus::Success);
        assert_eq!(work.gaps_filled, 1);
        assert_eq!(work.candles_stored, 5);
        assert!(!work.full_history);

        let calls = h.exchange.kline_calls();
        assert_eq!(calls[0].1, today - 4 * DAY_MS);
        assert_eq!(calls[0].3, 1000);
        assert_eq!(
            h.service.get_symbol_status("BTCUSDT").unwrap().map(|t| t.timestamp_millis()),
            Some(today)
        );
    }

    #[tokio::test]
    async fn test_without_gaps_fetches_small_window_after_latest() {
        let today = today_midnight();
        let candles = MockCandleStore::default();
        candles.seed_days("BTCUSDT", [today - DAY_MS, today]);
        let config = IngestionConfig {
            freshness_window: Duration::zero(),
            ..test_config()
        };
        let h = harness(
            MockExchange::with_symbols(&["BTCUSDT"]),
            candles,
            MockProcessingStore::default(),
            config,
        );

        let report = h.service.run_ingestion_slice().await.unwrap();

        assert_eq!(report.symbols[0].status, SymbolStatus::Success);
        assert_eq!(report.symbols[0].work.gaps_filled, 0);
        let calls = h.exchange.kline_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1, today + 1);
        assert_eq!(calls[0].3, 10);
        // Months are rebuilt even when nothing new arrived.
        assert!(!h.service.get_monthly_history("BTCUSDT").unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_symbol_failure_is_counted_and_slice_continues() {
        let mut exchange = MockExchange::with_symbols(&["AAAUSDT", "BADUSDT", "CCCUSDT"]);
        exchange.failing_symbols.insert("BADUSDT".to_string());
        let config = IngestionConfig {
            symbols_per_invocation: 3,
            ..test_config()
        };
        let h = harness(
            exchange,
            non_empty_store(),
            MockProcessingStore::default(),
            config,
        );

        let report = h.service.run_ingestion_slice().await.unwrap();

        assert_eq!(report.processed_count, 3);
        assert_eq!(report.success_count, 2);
        assert_eq!(report.error_count, 1);
        assert_eq!(report.symbols[1].status, SymbolStatus::Failed);
        assert!(report.symbols[1].error.as_deref().unwrap().contains("connection reset"));
        assert_eq!(report.outcome, SliceOutcome::Completed);
        assert_eq!(h.processing.current().last_processed_index, -1);
    }

    // =========================================================================
    // Fatal errors
    // =========================================================================

    #[tokio::test]
    async fn test_universe_failure_aborts_and_releases_claim() {
        let exchange = MockExchange {
            fail_universe: true,
            ..MockExchange::default()
        };
        let h = harness(
            exchange,
            non_empty_store(),
            MockProcessingStore::with_state(idle_state_at(3, 10)),
            test_config(),
        );

        let err = h.service.run_ingestion_slice().await.unwrap_err();

        match err {
            Error::RunAborted { phase, source } => {
                assert_eq!(phase, RunPhase::FetchingUniverse);
                assert!(matches!(*source, Error::MarketData(ref e) if e.is_rate_limited()));
            }
            other => panic!("expected RunAborted, got {other:?}"),
        }
        let state = h.processing.current();
        assert!(!state.is_processing);
        assert_eq!(state.last_processed_index, 3);
    }

    #[tokio::test]
    async fn test_bootstrap_check_failure_aborts_and_releases_claim() {
        let names = ten_symbols();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let h = harness(
            MockExchange::with_symbols(&refs),
            non_empty_store().break_count(),
            MockProcessingStore::with_state(idle_state_at(3, 10)),
            test_config(),
        );

        let err = h.service.run_ingestion_slice().await.unwrap_err();

        match err {
            Error::RunAborted { phase, source } => {
                assert_eq!(phase, RunPhase::CheckingBootstrap);
                assert!(matches!(*source, Error::Database(DatabaseError::QueryFailed(_))));
            }
            other => panic!("expected RunAborted, got {other:?}"),
        }
        assert!(h.exchange.kline_calls().is_empty());
        let state = h.processing.current();
        assert!(!state.is_processing);
        assert_eq!(state.last_processed_index, 3);
        assert_eq!(state.total_symbols, 10);
    }

    // =========================================================================
    // Read operations
    // =========================================================================

    #[tokio::test]
    async fn test_status_reflects_saved_progress() {
        let names = ten_symbols();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let h = harness(
            MockExchange::with_symbols(&refs),
            non_empty_store(),
            MockProcessingStore::default(),
            test_config(),
        );

        let before = h.service.get_processing_status().unwrap();
        assert!(!before.exists);

        h.service.run_ingestion_slice().await.unwrap();

        let status = h.service.get_processing_status().unwrap();
        assert!(status.exists);
        assert!(!status.is_processing);
        assert_eq!(status.last_processed_index, 0);
        assert_eq!(status.total_symbols, 10);
        assert_eq!(status.percent_complete, 10);
        assert_eq!(status.remaining_symbols, 9);
        assert!(h.service.ping().is_ok());
    }

    #[tokio::test]
    async fn test_unknown_symbol_has_no_status() {
        let h = harness(
            MockExchange::default(),
            MockCandleStore::default(),
            MockProcessingStore::default(),
            test_config(),
        );

        assert_eq!(h.service.get_symbol_status("NOPEUSDT").unwrap(), None);
        assert!(h.service.get_seasonality("NOPEUSDT").unwrap().years.is_empty());
    }
}
