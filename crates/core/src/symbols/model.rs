use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use seasonality_market_data::Instrument;

/// A tradable pair known to the registry. Symbols are never deleted; a
/// delisted pair keeps its row with `is_active` cleared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Symbol {
    pub symbol: String,
    pub base_asset: String,
    pub quote_asset: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Registry upsert payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSymbol {
    pub symbol: String,
    pub base_asset: String,
    pub quote_asset: String,
    pub is_active: bool,
}

impl From<&Instrument> for NewSymbol {
    fn from(instrument: &Instrument) -> Self {
        Self {
            symbol: instrument.symbol.clone(),
            base_asset: instrument.base_asset.clone(),
            quote_asset: instrument.quote_asset.clone(),
            is_active: true,
        }
    }
}
