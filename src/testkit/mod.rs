//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`domain`] - Builders for markets, positions and fixtures.
//! - [`ledger`] - [`ScriptedLedger`](ledger::ScriptedLedger), a fake ledger
//!   with scripted outages and a read counter.
//! - [`services`] - The full service graph over in-memory adapters.

pub mod domain;
pub mod ledger;
pub mod services;
