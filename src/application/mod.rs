//! Application services (use cases).
//!
//! These services load state through ports, apply domain rules and write
//! results back. Concurrency control (per-key locks) lives here.

pub mod cache;
pub mod deployment;
pub mod events;
pub mod ledger;
pub mod lock;
pub mod market;
pub mod resolution;
pub mod retry;
pub mod settlement;
pub mod standings;

pub use deployment::DeploymentService;
pub use events::EventBus;
pub use ledger::LedgerReader;
pub use market::{Freshness, MarketService, MarketView};
pub use resolution::{ResolutionService, SyncOutcome};
pub use retry::RetryPolicy;
pub use settlement::{ClaimOutcome, SettlementService, WalletStats};
pub use standings::{StandingsService, StandingsWatcher};
