//! Adapters at the edges of the hexagon.
//!
//! - [`inbound`] drives the application (the operator CLI).
//! - [`outbound`] implements the ports (stores, ledger, schedule, operators).

pub mod inbound;
pub mod outbound;
