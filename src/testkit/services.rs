//! The full service graph over in-memory adapters.

use std::sync::Arc;
use std::time::Duration;

use super::ledger::ScriptedLedger;
use crate::adapter::outbound::auth::Allowlist;
use crate::adapter::outbound::memory::{MemoryMarketStore, MemoryPositionStore};
use crate::adapter::outbound::schedule::StaticSchedule;
use crate::application::RetryPolicy;
use crate::domain::id::WalletAddress;
use crate::domain::volume::VolumePolicy;
use crate::infrastructure::bootstrap::{Core, CoreSettings};

pub type MemoryCore =
    Core<MemoryMarketStore, MemoryPositionStore, ScriptedLedger, StaticSchedule, Allowlist>;

/// Operator wallet allowed by [`TestCore`].
pub const OPERATOR: &str = "operator-wallet";

/// Services plus handles on every fake they run over.
pub struct TestCore {
    pub core: MemoryCore,
    pub markets: Arc<MemoryMarketStore>,
    pub positions: Arc<MemoryPositionStore>,
    pub ledger: Arc<ScriptedLedger>,
}

/// No ledger caching and three near-instant attempts.
pub fn settings() -> CoreSettings {
    CoreSettings {
        cache_ttl: Duration::ZERO,
        retry: RetryPolicy {
            max_attempts: 3,
            initial_delay_ms: 1,
            max_delay_ms: 2,
            backoff_multiplier: 2.0,
        },
        volume: VolumePolicy::default(),
        event_capacity: 64,
    }
}

impl TestCore {
    /// Empty stores, empty ledger, no tournaments.
    pub fn new() -> Self {
        Self::build(
            MemoryMarketStore::new(),
            MemoryPositionStore::new(),
            ScriptedLedger::new(),
            StaticSchedule::new(),
            settings(),
        )
    }

    pub fn build(
        markets: MemoryMarketStore,
        positions: MemoryPositionStore,
        ledger: ScriptedLedger,
        schedule: StaticSchedule,
        settings: CoreSettings,
    ) -> Self {
        let markets = Arc::new(markets);
        let positions = Arc::new(positions);
        let ledger = Arc::new(ledger);
        let core = Core::assemble(
            Arc::clone(&markets),
            Arc::clone(&positions),
            Arc::clone(&ledger),
            Arc::new(schedule),
            Arc::new(Allowlist::new([WalletAddress::from(OPERATOR)])),
            settings,
        );
        Self {
            core,
            markets,
            positions,
            ledger,
        }
    }
}

impl Default for TestCore {
    fn default() -> Self {
        Self::new()
    }
}
