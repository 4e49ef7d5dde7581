//! SQLite storage implementation for the symbol registry.

mod model;
mod repository;

pub use model::SymbolDB;
pub use repository::SymbolRepository;
