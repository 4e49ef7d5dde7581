use serde::{Deserialize, Serialize};

/// Status string the exchange uses for instruments open for trading.
pub const TRADING_STATUS: &str = "TRADING";

/// A listed trading pair as returned by the instrument listing endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instrument {
    /// Pair identifier, e.g. "BTCUSDT"
    pub symbol: String,
    /// Asset being priced, e.g. "BTC"
    pub base_asset: String,
    /// Asset the price is expressed in, e.g. "USDT"
    pub quote_asset: String,
    /// Listing status, "TRADING" when active
    pub status: String,
}

impl Instrument {
    /// Active spot instrument quoted in `quote_asset`.
    pub fn is_tradable_with_quote(&self, quote_asset: &str) -> bool {
        self.status == TRADING_STATUS && self.quote_asset == quote_asset
    }
}

/// Envelope of the instrument listing endpoint. Unknown fields are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct ExchangeInfo {
    #[serde(default)]
    pub symbols: Vec<Instrument>,
}
