use async_trait::async_trait;
use diesel::dsl::{count_star, max};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;

use super::model::{DailyCandleDB, MonthlyCandleDB, DAILY_CANDLE_COLUMNS};
use crate::db::{get_connection, WriteHandle};
use crate::errors::{IntoCore, StorageError};
use crate::schema::daily_candles::dsl as daily_dsl;
use crate::schema::monthly_candles::dsl as monthly_dsl;
use crate::utils::chunk_for_sqlite;
use seasonality_core::candles::{CandleStore, DailyCandle, MonthlyCandle};
use seasonality_core::Result;

pub struct CandleRepository {
    pool: Arc<Pool<ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl CandleRepository {
    pub fn new(pool: Arc<Pool<ConnectionManager<SqliteConnection>>>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl CandleStore for CandleRepository {
    // =========================================================================
    // Daily candles
    // =========================================================================

    async fn upsert_daily_candles(&self, candles: &[DailyCandle]) -> Result<usize> {
        if candles.is_empty() {
            return Ok(0);
        }

        let db_rows: Vec<DailyCandleDB> = candles.iter().map(DailyCandleDB::from).collect();

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                let mut total_upserted = 0;
                for chunk in chunk_for_sqlite(&db_rows, DAILY_CANDLE_COLUMNS) {
                    total_upserted += diesel::replace_into(daily_dsl::daily_candles)
                        .values(chunk)
                        .execute(conn)
                        .map_err(StorageError::QueryFailed)?;
                }
                Ok(total_upserted)
            })
            .await
    }

    fn daily_timestamps_in_range(
        &self,
        symbol: &str,
        start_ms: i64,
        end_ms: i64,
    ) -> Result<Vec<i64>> {
        let mut conn = get_connection(&self.pool)?;
        daily_dsl::daily_candles
            .filter(daily_dsl::symbol.eq(symbol))
            .filter(daily_dsl::timestamp.ge(start_ms))
            .filter(daily_dsl::timestamp.le(end_ms))
            .select(daily_dsl::timestamp)
            .order(daily_dsl::timestamp.asc())
            .load::<i64>(&mut conn)
            .into_core()
    }

    fn daily_candles(&self, symbol: &str) -> Result<Vec<DailyCandle>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = daily_dsl::daily_candles
            .filter(daily_dsl::symbol.eq(symbol))
            .order(daily_dsl::timestamp.asc())
            .select(DailyCandleDB::as_select())
            .load::<DailyCandleDB>(&mut conn)
            .into_core()?;

        rows.into_iter().map(DailyCandle::try_from).collect()
    }

    fn latest_daily_timestamp(&self, symbol: &str) -> Result<Option<i64>> {
        let mut conn = get_connection(&self.pool)?;
        daily_dsl::daily_candles
            .filter(daily_dsl::symbol.eq(symbol))
            .select(max(daily_dsl::timestamp))
            .first::<Option<i64>>(&mut conn)
            .into_core()
    }

    fn count_daily_candles(&self) -> Result<i64> {
        let mut conn = get_connection(&self.pool)?;
        daily_dsl::daily_candles
            .select(count_star())
            .first::<i64>(&mut conn)
            .into_core()
    }

    // =========================================================================
    // Monthly candles
    // =========================================================================

    async fn upsert_monthly_candle(&self, candle: &MonthlyCandle) -> Result<MonthlyCandle> {
        let db_row = MonthlyCandleDB::from(candle);

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                diesel::replace_into(monthly_dsl::monthly_candles)
                    .values(&db_row)
                    .execute(conn)
                    .map_err(StorageError::QueryFailed)?;
                Ok(())
            })
            .await?;

        Ok(candle.clone())
    }

    fn get_monthly_candle(
        &self,
        symbol: &str,
        year: i32,
        month: u32,
    ) -> Result<Option<MonthlyCandle>> {
        let mut conn = get_connection(&self.pool)?;
        monthly_dsl::monthly_candles
            .filter(monthly_dsl::symbol.eq(symbol))
            .filter(monthly_dsl::year.eq(year))
            .filter(monthly_dsl::month.eq(month as i32))
            .select(MonthlyCandleDB::as_select())
            .first::<MonthlyCandleDB>(&mut conn)
            .optional()
            .into_core()?
            .map(MonthlyCandle::try_from)
            .transpose()
    }

    fn monthly_history(&self, symbol: &str) -> Result<Vec<MonthlyCandle>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = monthly_dsl::monthly_candles
            .filter(monthly_dsl::symbol.eq(symbol))
            .order((monthly_dsl::year.asc(), monthly_dsl::month.asc()))
            .select(MonthlyCandleDB::as_select())
            .load::<MonthlyCandleDB>(&mut conn)
            .into_core()?;

        rows.into_iter().map(MonthlyCandle::try_from).collect()
    }
}
