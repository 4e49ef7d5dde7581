//! Database model for the processing state.

use diesel::prelude::*;

use seasonality_core::processing::ProcessingState;
use seasonality_core::Result;

use crate::utils::{format_timestamp, parse_timestamp};

#[derive(Queryable, Identifiable, Selectable, Insertable, AsChangeset, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::processing_state)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(treat_none_as_null = true)]
pub struct ProcessingStateDB {
    pub id: i32,
    pub last_processed_symbol: Option<String>,
    pub last_processed_index: i64,
    pub total_symbols: i64,
    pub is_processing: bool,
    pub started_at: Option<String>,
    pub updated_at: String,
}

impl From<&ProcessingState> for ProcessingStateDB {
    fn from(state: &ProcessingState) -> Self {
        Self {
            id: state.id,
            last_processed_symbol: state.last_processed_symbol.clone(),
            last_processed_index: state.last_processed_index,
            total_symbols: state.total_symbols,
            is_processing: state.is_processing,
            started_at: state.started_at.as_ref().map(format_timestamp),
            updated_at: format_timestamp(&state.updated_at),
        }
    }
}

impl TryFrom<ProcessingStateDB> for ProcessingState {
    type Error = seasonality_core::Error;

    fn try_from(db: ProcessingStateDB) -> Result<Self> {
        Ok(ProcessingState {
            id: db.id,
            last_processed_symbol: db.last_processed_symbol,
            last_processed_index: db.last_processed_index,
            total_symbols: db.total_symbols,
            is_processing: db.is_processing,
            started_at: db.started_at.as_deref().map(parse_timestamp).transpose()?,
            updated_at: parse_timestamp(&db.updated_at)?,
        })
    }
}
