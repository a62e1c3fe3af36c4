//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │      Application        │
//!     ┌──────────────┤  Domain + Port          ├──────────────┐
//!     │              └─────────────────────────┘              │
//!     ▼                         ▼                             ▼
//! ┌─────────┐            ┌─────────────┐              ┌───────────┐
//! │ Ledger  │            │   Store     │              │ Schedule  │
//! │ Adapter │            │   Adapter   │              │  Adapter  │
//! └─────────┘            └─────────────┘              └───────────┘
//! ```

pub mod outbound;

pub use outbound::auth::Authorizer;
pub use outbound::ledger::Ledger;
pub use outbound::schedule::ScheduleSource;
pub use outbound::store::{MarketStore, PositionStore, ResolutionRecord, ResolutionWrite};
