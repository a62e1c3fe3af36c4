//! Tournament standings, recomputed on demand and on resolution events.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::domain::event::DomainEvent;
use crate::domain::id::TournamentId;
use crate::domain::market::MarketFilter;
use crate::domain::standings::{derive_standings, TournamentStandings};
use crate::error::{Error, Result};
use crate::port::outbound::schedule::ScheduleSource;
use crate::port::outbound::store::MarketStore;

/// Read-only standings queries.
pub struct StandingsService<M, S> {
    store: Arc<M>,
    schedule: Arc<S>,
}

impl<M, S> StandingsService<M, S>
where
    M: MarketStore,
    S: ScheduleSource,
{
    #[must_use]
    pub fn new(store: Arc<M>, schedule: Arc<S>) -> Self {
        Self { store, schedule }
    }

    /// Derive standings from scratch for one tournament.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownTournament`] if no schedule is configured for it.
    pub async fn compute_standings(&self, tournament: &TournamentId) -> Result<TournamentStandings> {
        let fixtures = self
            .schedule
            .schedule(tournament)
            .ok_or_else(|| Error::UnknownTournament(tournament.clone()))?;
        let filter = MarketFilter {
            include_test: true,
            ..MarketFilter::for_tournament(tournament.clone())
        };
        let markets = self.store.list(&filter).await?;
        Ok(derive_standings(tournament, &fixtures, &markets))
    }

    #[must_use]
    pub fn tournaments(&self) -> Vec<TournamentId> {
        self.schedule.tournaments()
    }
}

/// Keeps the latest standings per tournament, refreshed on `MarketResolved`.
pub struct StandingsWatcher<M, S> {
    service: Arc<StandingsService<M, S>>,
    latest: RwLock<HashMap<TournamentId, TournamentStandings>>,
}

impl<M, S> StandingsWatcher<M, S>
where
    M: MarketStore + 'static,
    S: ScheduleSource + 'static,
{
    #[must_use]
    pub fn new(service: Arc<StandingsService<M, S>>) -> Self {
        Self {
            service,
            latest: RwLock::new(HashMap::new()),
        }
    }

    /// Most recent standings computed for a tournament.
    #[must_use]
    pub fn latest(&self, tournament: &TournamentId) -> Option<TournamentStandings> {
        self.latest.read().get(tournament).cloned()
    }

    /// Recompute and store one tournament.
    ///
    /// # Errors
    ///
    /// As [`StandingsService::compute_standings`].
    pub async fn refresh(&self, tournament: &TournamentId) -> Result<()> {
        let standings = self.service.compute_standings(tournament).await?;
        debug!(tournament = %tournament, matches = standings.matches_counted, "Standings refreshed");
        self.latest.write().insert(tournament.clone(), standings);
        Ok(())
    }

    async fn refresh_all(&self) {
        for tournament in self.service.tournaments() {
            if let Err(err) = self.refresh(&tournament).await {
                warn!(tournament = %tournament, error = %err, "Standings refresh failed");
            }
        }
    }

    /// Consume events until the bus closes.
    pub fn spawn(self: Arc<Self>, mut rx: broadcast::Receiver<DomainEvent>) -> JoinHandle<()> {
        tokio::spawn(async move {
            self.refresh_all().await;
            loop {
                match rx.recv().await {
                    Ok(DomainEvent::MarketResolved(event)) => {
                        let Some(tournament) = event.tournament_id else {
                            continue;
                        };
                        if let Err(err) = self.refresh(&tournament).await {
                            warn!(tournament = %tournament, error = %err, "Standings refresh failed");
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Standings watcher lagged, refreshing all");
                        self.refresh_all().await;
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        info!("Event bus closed, standings watcher stopping");
                        break;
                    }
                }
            }
        })
    }
}
