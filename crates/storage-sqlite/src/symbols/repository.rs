use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;
use diesel::upsert::excluded;
use std::sync::Arc;

use super::model::SymbolDB;
use crate::db::{get_connection, WriteHandle};
use crate::errors::{IntoCore, StorageError};
use crate::schema::symbols::dsl;
use crate::utils::format_timestamp;
use seasonality_core::symbols::{NewSymbol, Symbol, SymbolStore};
use seasonality_core::Result;

pub struct SymbolRepository {
    pool: Arc<Pool<ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl SymbolRepository {
    pub fn new(pool: Arc<Pool<ConnectionManager<SqliteConnection>>>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl SymbolStore for SymbolRepository {
    async fn upsert_symbols(&self, symbols: &[NewSymbol]) -> Result<usize> {
        if symbols.is_empty() {
            return Ok(0);
        }

        let now = format_timestamp(&Utc::now());
        let rows: Vec<SymbolDB> = symbols
            .iter()
            .map(|s| SymbolDB {
                symbol: s.symbol.clone(),
                base_asset: s.base_asset.clone(),
                quote_asset: s.quote_asset.clone(),
                is_active: s.is_active,
                created_at: now.clone(),
                updated_at: now.clone(),
            })
            .collect();

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                let mut written = 0;
                // created_at is left untouched on conflict.
                for row in &rows {
                    written += diesel::insert_into(dsl::symbols)
                        .values(row)
                        .on_conflict(dsl::symbol)
                        .do_update()
                        .set((
                            dsl::base_asset.eq(excluded(dsl::base_asset)),
                            dsl::quote_asset.eq(excluded(dsl::quote_asset)),
                            dsl::is_active.eq(excluded(dsl::is_active)),
                            dsl::updated_at.eq(excluded(dsl::updated_at)),
                        ))
                        .execute(conn)
                        .map_err(StorageError::QueryFailed)?;
                }
                Ok(written)
            })
            .await
    }

    fn list_active_symbols(&self) -> Result<Vec<String>> {
        let mut conn = get_connection(&self.pool)?;
        dsl::symbols
            .filter(dsl::is_active.eq(true))
            .select(dsl::symbol)
            .order(dsl::symbol.asc())
            .load::<String>(&mut conn)
            .into_core()
    }

    fn get_symbol(&self, symbol: &str) -> Result<Option<Symbol>> {
        let mut conn = get_connection(&self.pool)?;
        dsl::symbols
            .find(symbol)
            .select(SymbolDB::as_select())
            .first::<SymbolDB>(&mut conn)
            .optional()
            .into_core()?
            .map(Symbol::try_from)
            .transpose()
    }
}
