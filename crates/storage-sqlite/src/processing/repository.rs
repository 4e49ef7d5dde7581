use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;
use log::debug;
use std::sync::Arc;

use super::model::ProcessingStateDB;
use crate::db::{get_connection, WriteHandle};
use crate::errors::{IntoCore, StorageError};
use crate::schema::processing_state::dsl;
use seasonality_core::constants::PROCESSING_STATE_ID;
use seasonality_core::processing::{ClaimOutcome, ProcessingState, ProcessingStateStore};
use seasonality_core::Result;

/// Stores the single processing state row (id 1 unless configured).
pub struct ProcessingStateRepository {
    pool: Arc<Pool<ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
    id: i32,
}

impl ProcessingStateRepository {
    pub fn new(pool: Arc<Pool<ConnectionManager<SqliteConnection>>>, writer: WriteHandle) -> Self {
        Self {
            pool,
            writer,
            id: PROCESSING_STATE_ID,
        }
    }
}

fn load_row(conn: &mut SqliteConnection, id: i32) -> Result<Option<ProcessingState>> {
    dsl::processing_state
        .find(id)
        .select(ProcessingStateDB::as_select())
        .first::<ProcessingStateDB>(conn)
        .optional()
        .into_core()?
        .map(ProcessingState::try_from)
        .transpose()
}

fn write_row(conn: &mut SqliteConnection, state: &ProcessingState) -> Result<()> {
    diesel::replace_into(dsl::processing_state)
        .values(ProcessingStateDB::from(state))
        .execute(conn)
        .map_err(StorageError::QueryFailed)?;
    Ok(())
}

#[async_trait]
impl ProcessingStateStore for ProcessingStateRepository {
    fn load(&self) -> Result<Option<ProcessingState>> {
        let mut conn = get_connection(&self.pool)?;
        load_row(&mut conn, self.id)
    }

    async fn load_or_init(&self) -> Result<ProcessingState> {
        let id = self.id;
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<ProcessingState> {
                if let Some(state) = load_row(conn, id)? {
                    return Ok(state);
                }
                debug!("Initialising processing state row {}", id);
                let state = ProcessingState::new(id, Utc::now());
                write_row(conn, &state)?;
                Ok(state)
            })
            .await
    }

    async fn save(&self, state: &ProcessingState) -> Result<ProcessingState> {
        let state = ProcessingState {
            id: self.id,
            ..state.clone()
        };
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<ProcessingState> {
                write_row(conn, &state)?;
                Ok(state)
            })
            .await
    }

    async fn try_claim(&self, now: DateTime<Utc>, stale_after: Duration) -> Result<ClaimOutcome> {
        let id = self.id;
        // Runs inside the writer's immediate transaction, so the read and the
        // conditional write cannot interleave with another claim.
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<ClaimOutcome> {
                let current = load_row(conn, id)?.unwrap_or_else(|| ProcessingState::new(id, now));
                let outcome = current.try_claim(now, stale_after);
                if let ClaimOutcome::Claimed { state, .. } = &outcome {
                    write_row(conn, state)?;
                }
                Ok(outcome)
            })
            .await
    }

    fn ping(&self) -> Result<()> {
        let mut conn = get_connection(&self.pool)?;
        diesel::sql_query("SELECT 1")
            .execute(&mut conn)
            .into_core()?;
        Ok(())
    }
}
