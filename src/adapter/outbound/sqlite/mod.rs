//! SQLite persistence adapters.
//!
//! Provides the SQLite-backed market cache and position store using
//! Diesel ORM.

pub mod database;
pub mod store;

pub use store::{SqliteMarketStore, SqlitePositionStore};
