//! Symbol registry.

mod model;
mod store;

pub use model::{NewSymbol, Symbol};
pub use store::SymbolStore;
