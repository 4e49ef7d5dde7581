//! SQLite storage implementation for the processing state row.

mod model;
mod repository;

pub use model::ProcessingStateDB;
pub use repository::ProcessingStateRepository;
