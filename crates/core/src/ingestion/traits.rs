use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::report::SliceReport;
use crate::candles::{MonthlyCandle, SeasonalitySummary};
use crate::errors::Result;
use crate::processing::ProcessingStatus;

/// Operations the ingestion engine exposes to CLIs and other front ends.
#[async_trait]
pub trait IngestionServiceTrait: Send + Sync {
    /// Runs one bounded slice of the ingestion state machine.
    ///
    /// A partial slice (`Paused`) and a refused one (`AlreadyRunning`) are
    /// normal results. Errors are returned only for fatal preconditions, and
    /// the run claim is released before they are.
    async fn run_ingestion_slice(&self) -> Result<SliceReport>;

    /// Read-only summary of the persisted processing state.
    fn get_processing_status(&self) -> Result<ProcessingStatus>;

    /// Open time of the newest stored daily candle for `symbol`.
    fn get_symbol_status(&self, symbol: &str) -> Result<Option<DateTime<Utc>>>;

    /// Active symbols, ascending.
    fn list_active_symbols(&self) -> Result<Vec<String>>;

    /// Monthly candles for `symbol`, ascending by (year, month).
    fn get_monthly_history(&self, symbol: &str) -> Result<Vec<MonthlyCandle>>;

    /// Per-calendar-month average returns, heatmap and years for `symbol`.
    fn get_seasonality(&self, symbol: &str) -> Result<SeasonalitySummary>;

    /// Checks the store is reachable.
    fn ping(&self) -> Result<()>;
}
