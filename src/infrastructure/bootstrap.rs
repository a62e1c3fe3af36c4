//! Composition root: wires adapters into the application services.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::adapter::outbound::auth::Allowlist;
use crate::adapter::outbound::ledger::FileLedger;
use crate::adapter::outbound::schedule::StaticSchedule;
use crate::adapter::outbound::sqlite::database::connection::open;
use crate::adapter::outbound::sqlite::{SqliteMarketStore, SqlitePositionStore};
use crate::application::{
    DeploymentService, EventBus, LedgerReader, MarketService, ResolutionService, RetryPolicy,
    SettlementService, StandingsService,
};
use crate::domain::volume::VolumePolicy;
use crate::error::Result;
use crate::infrastructure::config::settings::Config;
use crate::infrastructure::config::tournament;
use crate::port::outbound::auth::Authorizer;
use crate::port::outbound::ledger::Ledger;
use crate::port::outbound::schedule::ScheduleSource;
use crate::port::outbound::store::{MarketStore, PositionStore};

/// Tunables shared by the services.
#[derive(Debug, Clone)]
pub struct CoreSettings {
    pub cache_ttl: Duration,
    pub retry: RetryPolicy,
    pub volume: VolumePolicy,
    pub event_capacity: usize,
}

impl Default for CoreSettings {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(30),
            retry: RetryPolicy::default(),
            volume: VolumePolicy::default(),
            event_capacity: 256,
        }
    }
}

impl From<&Config> for CoreSettings {
    fn from(config: &Config) -> Self {
        Self {
            cache_ttl: config.cache_ttl(),
            retry: config.retry.clone(),
            volume: config.volume.policy(),
            ..Self::default()
        }
    }
}

/// Every settlement use case over one set of adapters.
pub struct Core<M, P, L, S, A> {
    pub markets: MarketService<M, L>,
    pub resolution: ResolutionService<M, L>,
    pub settlement: SettlementService<M, P>,
    pub deployment: DeploymentService<M, A>,
    pub standings: Arc<StandingsService<M, S>>,
    pub events: EventBus,
}

impl<M, P, L, S, A> Core<M, P, L, S, A>
where
    M: MarketStore,
    P: PositionStore,
    L: Ledger,
    S: ScheduleSource,
    A: Authorizer,
{
    #[must_use]
    pub fn assemble(
        markets: Arc<M>,
        positions: Arc<P>,
        ledger: Arc<L>,
        schedule: Arc<S>,
        authorizer: Arc<A>,
        settings: CoreSettings,
    ) -> Self {
        let reader = Arc::new(LedgerReader::new(ledger, settings.cache_ttl, settings.retry));
        let events = EventBus::new(settings.event_capacity);
        Self {
            resolution: ResolutionService::new(
                Arc::clone(&markets),
                Arc::clone(&reader),
                settings.volume.clone(),
                events.clone(),
            ),
            markets: MarketService::new(Arc::clone(&markets), reader, settings.volume),
            settlement: SettlementService::new(Arc::clone(&markets), positions),
            deployment: DeploymentService::new(Arc::clone(&markets), authorizer),
            standings: Arc::new(StandingsService::new(markets, schedule)),
            events,
        }
    }
}

/// The production wiring: SQLite cache, file ledger, configured schedule.
pub type SqliteCore =
    Core<SqliteMarketStore, SqlitePositionStore, FileLedger, StaticSchedule, Allowlist>;

/// Open the database and build the services described by `config`.
///
/// # Errors
/// Returns an error if the database cannot be opened or migrated.
pub fn build(config: &Config) -> Result<SqliteCore> {
    let pool = open(&config.database.url)?;
    info!(database = %config.database.url, ledger = %config.ledger.snapshot_path, "Stores ready");

    Ok(Core::assemble(
        Arc::new(SqliteMarketStore::new(pool.clone())),
        Arc::new(SqlitePositionStore::new(pool)),
        Arc::new(FileLedger::new(
            &config.ledger.snapshot_path,
            config.ledger.token_decimals,
        )),
        Arc::new(tournament::schedule(&config.tournaments)),
        Arc::new(Allowlist::new(config.operators.wallets())),
        CoreSettings::from(config),
    ))
}
