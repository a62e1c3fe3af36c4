//! Outbound adapters (driven side).

pub mod auth;
pub mod ledger;
pub mod memory;
pub mod schedule;
pub mod sqlite;
