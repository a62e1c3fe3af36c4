//! Stakeline - settlement and reconciliation for a token-staked prediction market.
//!
//! Markets hold 2 to 4 outcomes. Stakes pool per outcome and are escrowed on
//! a ledger; once the ledger records a winner, every winning position is paid
//! its proportional share of the settlement volume minus fees. This crate
//! keeps a cache of that ledger honest and settles positions from it.
//!
//! # Architecture
//!
//! - [`domain`] - Pure rules: normalization, volume reconciliation, payout
//!   arithmetic, deployment option selection, standings derivation
//! - [`port`] - Traits the application needs from the outside world
//! - [`application`] - Use cases: market queries, resolution sync, claims,
//!   deployment, standings, plus caching, retry and keyed locking
//! - [`adapter`] - SQLite and in-memory stores, file ledger, static schedule,
//!   operator allowlist, and the operator CLI
//! - [`infrastructure`] - Configuration and service wiring
//! - [`error`] - Crate error type
//!
//! # Features
//!
//! - `testkit` - Builders and a scripted ledger for integration tests
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use stakeline::domain::id::{MarketAddress, WalletAddress};
//! use stakeline::domain::market::{Market, MarketStatus};
//! use stakeline::domain::position::{Position, PositionKey};
//! use stakeline::domain::settlement::compute_payout;
//!
//! let mut market = Market::new(
//!     MarketAddress::from("m1"),
//!     "Inter Miami - Porto",
//!     vec!["Inter Miami".into(), "Porto".into()],
//! );
//! market.option_pools = vec![dec!(600), dec!(400)];
//! market.total_volume = dec!(1000);
//! market.status = MarketStatus::Resolved;
//! market.resolved_option = Some(0);
//! market.creator_fee_bps = 200;
//!
//! let key = PositionKey::new(market.address.clone(), WalletAddress::from("w1"), 0);
//! let payout = compute_payout(&market, &Position::new(key, dec!(60))).unwrap();
//! assert_eq!(payout.net, dec!(95.5));
//! ```

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
