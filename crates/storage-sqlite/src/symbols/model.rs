//! Database model for registry symbols.

use diesel::prelude::*;

use seasonality_core::symbols::Symbol;
use seasonality_core::Result;

use crate::utils::parse_timestamp;

#[derive(Queryable, Identifiable, Selectable, Insertable, AsChangeset, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::symbols)]
#[diesel(primary_key(symbol))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SymbolDB {
    pub symbol: String,
    pub base_asset: String,
    pub quote_asset: String,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl TryFrom<SymbolDB> for Symbol {
    type Error = seasonality_core::Error;

    fn try_from(db: SymbolDB) -> Result<Self> {
        Ok(Symbol {
            created_at: parse_timestamp(&db.created_at)?,
            updated_at: parse_timestamp(&db.updated_at)?,
            symbol: db.symbol,
            base_asset: db.base_asset,
            quote_asset: db.quote_asset,
            is_active: db.is_active,
        })
    }
}
