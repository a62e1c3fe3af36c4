//! Settlement domain: canonical types and pure rules.
//!
//! Nothing in here performs I/O. Application services load state through
//! ports, call these functions, and write results back.

pub mod deployment;
pub mod event;
pub mod id;
pub mod ledger;
pub mod market;
pub mod money;
pub mod normalize;
pub mod position;
pub mod settlement;
pub mod standings;
pub mod volume;

pub use deployment::{CandidateMarket, DeploymentPlan, DeploymentRecord, ValidationError};
pub use event::{DomainEvent, MarketResolved};
pub use id::{MarketAddress, TournamentId, WalletAddress};
pub use ledger::{LedgerAccount, LedgerSnapshot};
pub use market::{Market, MarketFilter, MarketStatus, VolumeSource};
pub use money::Amount;
pub use position::{ClaimReceipt, Position, PositionKey};
pub use settlement::{Payout, SettlementSummary};
pub use standings::{GroupTable, ScheduledMatch, StandingsRow, TournamentStandings};
pub use volume::{VolumeAnalysis, VolumePolicy};
