//! Outbound ports (driven side): interfaces implemented by outbound adapters.
//!
//! These contracts describe the infrastructure the settlement core depends
//! on: the authoritative ledger, the market cache, the tournament schedule
//! and operator authorization.

pub mod auth;
pub mod ledger;
pub mod schedule;
pub mod store;
