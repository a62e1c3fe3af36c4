//! Resolution synchronization from the ledger into the cache.
//!
//! Transitions only ever go from open to resolved. The write is serialized
//! per market address and guarded by a conditional store update, so two
//! concurrent syncs cannot both record an outcome.

use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info, warn};

use super::events::EventBus;
use super::ledger::LedgerReader;
use super::lock::KeyedLocks;
use crate::domain::event::MarketResolved;
use crate::domain::id::MarketAddress;
use crate::domain::ledger::LedgerSnapshot;
use crate::domain::market::{Market, MarketFilter, MarketStatus};
use crate::domain::normalize::fit_pools;
use crate::domain::volume::{self, VolumePolicy};
use crate::error::{Error, Result};
use crate::port::outbound::ledger::Ledger;
use crate::port::outbound::store::{MarketStore, ResolutionRecord, ResolutionWrite};

/// What a single sync did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SyncOutcome {
    /// First transition; a `MarketResolved` event was published.
    Resolved { option: u8 },
    /// Cache already matched the ledger.
    AlreadyResolved { option: u8 },
    /// Ledger has not recorded an outcome.
    StillOpen,
    /// Cancelled on the ledger or in the cache; nothing was written.
    Cancelled,
    /// Ledger read failed after retries; nothing changed.
    Unavailable,
}

/// Ledger side of a [`ResolutionStatus`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum LedgerResolution {
    /// The ledger answered; `option` is set once it records an outcome.
    Available {
        status: MarketStatus,
        option: Option<u8>,
    },
    /// The ledger has no account at this address.
    Missing,
    /// The read failed after retries.
    Unavailable {
        reason: String,
    },
}

/// Read-only comparison of cached and ledger resolution state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolutionStatus {
    pub address: MarketAddress,
    pub cached_status: MarketStatus,
    pub cached_option: Option<u8>,
    pub ledger: LedgerResolution,
    /// The ledger records an outcome the cache does not hold yet.
    pub needs_sync: bool,
}

/// Per-market result of [`ResolutionService::sync_all`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum BatchResult {
    Synced(SyncOutcome),
    /// Cache and ledger disagree; left for an operator.
    Conflict { cached: u8, ledger: u8 },
    Failed { reason: String },
}

/// One market's line in a resolution sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchEntry {
    pub address: MarketAddress,
    pub result: BatchResult,
}

/// Moves cached markets to resolved once the ledger records an outcome.
///
/// The pools and volume read with the outcome are stored in the same write,
/// so claims settle against the snapshot that resolved the market.
pub struct ResolutionService<M, L> {
    store: Arc<M>,
    ledger: Arc<LedgerReader<L>>,
    policy: VolumePolicy,
    locks: KeyedLocks<MarketAddress>,
    events: EventBus,
}

impl<M, L> ResolutionService<M, L>
where
    M: MarketStore,
    L: Ledger,
{
    #[must_use]
    pub fn new(
        store: Arc<M>,
        ledger: Arc<LedgerReader<L>>,
        policy: VolumePolicy,
        events: EventBus,
    ) -> Self {
        Self {
            store,
            ledger,
            policy,
            locks: KeyedLocks::new(),
            events,
        }
    }

    /// Markets with a lock entry right now. Entries are dropped once released.
    #[must_use]
    pub fn tracked_locks(&self) -> usize {
        self.locks.len()
    }

    /// Bring one cached market in line with the ledger's resolution.
    ///
    /// Safe to call repeatedly; ledger outages are reported as
    /// [`SyncOutcome::Unavailable`] rather than failing.
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`] if the market is not cached or not on the ledger.
    /// - [`Error::Conflict`] if the cache already holds a different outcome.
    /// - [`Error::InvalidLedger`] if the ledger account is inconsistent.
    pub async fn sync_resolution(&self, address: &MarketAddress) -> Result<SyncOutcome> {
        self.locks.run(address, self.sync_locked(address)).await
    }

    async fn sync_locked(&self, address: &MarketAddress) -> Result<SyncOutcome> {
        let snapshot = match self.ledger.read_fresh(address).await {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => return Err(Error::NotFound(address.clone())),
            Err(err) if err.is_retryable() => {
                warn!(market = %address, error = %err, "Ledger unavailable, resolution unchanged");
                return Ok(SyncOutcome::Unavailable);
            }
            Err(err) => return Err(err),
        };

        let cached = self
            .store
            .get(address)
            .await?
            .ok_or_else(|| Error::NotFound(address.clone()))?;

        if snapshot.status == MarketStatus::Cancelled {
            info!(market = %address, "Ledger reports market cancelled, no transition");
            return Ok(SyncOutcome::Cancelled);
        }
        let Some(option) = snapshot.resolution() else {
            return Ok(SyncOutcome::StillOpen);
        };

        if let Some(existing) = cached.resolved_option {
            return Self::compare(address, existing, option);
        }
        if cached.status == MarketStatus::Cancelled {
            warn!(market = %address, option, "Cached market is cancelled, ledger outcome not recorded");
            return Ok(SyncOutcome::Cancelled);
        }

        let record = self.settlement_record(&cached, &snapshot, option);
        match self.store.record_resolution(address, &record).await? {
            ResolutionWrite::Applied => {
                info!(
                    market = %address,
                    option,
                    total_volume = %record.total_volume,
                    source = %record.volume_source,
                    "Market resolved"
                );
                self.events.publish(MarketResolved {
                    address: address.clone(),
                    option,
                    tournament_id: cached.tournament_id.clone(),
                });
                Ok(SyncOutcome::Resolved { option })
            }
            ResolutionWrite::AlreadySet(existing) => Self::compare(address, existing, option),
            ResolutionWrite::Closed(status) => {
                warn!(market = %address, %status, "Market closed before the outcome was recorded");
                Ok(SyncOutcome::Cancelled)
            }
        }
    }

    /// Pools and reconciled volume from the same snapshot as the outcome.
    fn settlement_record(
        &self,
        cached: &Market,
        snapshot: &LedgerSnapshot,
        option: u8,
    ) -> ResolutionRecord {
        let mut market = cached.clone();
        market.status = MarketStatus::Resolved;
        market.resolved_option = Some(option);
        market.option_pools = fit_pools(snapshot.option_pools.clone(), market.options.len());
        let settled = volume::reconcile(&market, snapshot.escrow_balance, &self.policy);
        ResolutionRecord {
            option,
            option_pools: settled.option_pools,
            total_volume: settled.total_volume,
            volume_source: settled.volume_source,
        }
    }

    fn compare(address: &MarketAddress, cached: u8, ledger: u8) -> Result<SyncOutcome> {
        if cached == ledger {
            return Ok(SyncOutcome::AlreadyResolved { option: ledger });
        }
        error!(
            market = %address,
            cached,
            ledger,
            "Cached resolution disagrees with ledger, operator action required"
        );
        Err(Error::Conflict {
            address: address.clone(),
            cached,
            ledger,
        })
    }

    /// Compare cached and ledger resolution without writing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the market is not cached.
    pub async fn resolution_status(&self, address: &MarketAddress) -> Result<ResolutionStatus> {
        let cached = self
            .store
            .get(address)
            .await?
            .ok_or_else(|| Error::NotFound(address.clone()))?;

        let ledger = match self.ledger.read_fresh(address).await {
            Ok(Some(snapshot)) => LedgerResolution::Available {
                status: snapshot.status,
                option: snapshot.resolution(),
            },
            Ok(None) => LedgerResolution::Missing,
            Err(err) => LedgerResolution::Unavailable {
                reason: err.to_string(),
            },
        };

        let needs_sync = match ledger {
            LedgerResolution::Available {
                option: Some(option),
                ..
            } => cached.resolved_option != Some(option),
            _ => false,
        };

        Ok(ResolutionStatus {
            address: address.clone(),
            cached_status: cached.status,
            cached_option: cached.resolved_option,
            ledger,
            needs_sync,
        })
    }

    /// Sync every open cached market. Each market is reported independently.
    ///
    /// # Errors
    ///
    /// Only fails if the market list itself cannot be read.
    pub async fn sync_all(&self) -> Result<Vec<BatchEntry>> {
        let all = MarketFilter {
            include_test: true,
            ..MarketFilter::default()
        };
        let open: Vec<Market> = self
            .store
            .list(&all)
            .await?
            .into_iter()
            .filter(|m| m.status.is_open() && m.resolved_option.is_none())
            .collect();

        let mut entries = Vec::with_capacity(open.len());
        for market in open {
            let result = match self.sync_resolution(&market.address).await {
                Ok(outcome) => BatchResult::Synced(outcome),
                Err(Error::Conflict { cached, ledger, .. }) => BatchResult::Conflict { cached, ledger },
                Err(err) => BatchResult::Failed {
                    reason: err.to_string(),
                },
            };
            entries.push(BatchEntry {
                address: market.address,
                result,
            });
        }

        let resolved = entries
            .iter()
            .filter(|e| matches!(e.result, BatchResult::Synced(SyncOutcome::Resolved { .. })))
            .count();
        info!(checked = entries.len(), resolved, "Resolution sweep complete");
        Ok(entries)
    }
}

