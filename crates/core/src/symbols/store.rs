use async_trait::async_trait;

use super::model::{NewSymbol, Symbol};
use crate::errors::Result;

/// Persistence for the symbol registry.
#[async_trait]
pub trait SymbolStore: Send + Sync {
    /// Insert new symbols or refresh existing ones, keeping `created_at`.
    /// Returns the number of rows written.
    async fn upsert_symbols(&self, symbols: &[NewSymbol]) -> Result<usize>;

    /// Names of active symbols, ascending.
    fn list_active_symbols(&self) -> Result<Vec<String>>;

    fn get_symbol(&self, symbol: &str) -> Result<Option<Symbol>>;
}
