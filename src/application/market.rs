//! Market queries and volume maintenance.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use super::ledger::LedgerReader;
use crate::domain::id::MarketAddress;
use crate::domain::market::{Market, MarketFilter, VolumeSource};
use crate::domain::money::Amount;
use crate::domain::normalize::{fit_pools, merge, MarketRecord};
use crate::domain::volume::{self, VolumeAnalysis, VolumePolicy};
use crate::error::{Error, Result};
use crate::port::outbound::ledger::Ledger;
use crate::port::outbound::store::MarketStore;

/// Whether a market view reflects a successful ledger read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Freshness {
    /// Merged from a successful ledger read.
    Live,
    /// Ledger unavailable; the last cached value is shown.
    Stale,
}

/// A market as presented to callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketView {
    /// Merged and volume-reconciled market.
    pub market: Market,
    pub freshness: Freshness,
}

impl MarketView {
    #[must_use]
    pub fn is_stale(&self) -> bool {
        self.freshness == Freshness::Stale
    }
}

/// Per-market result of a bulk volume resync.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum ResyncResult {
    /// The reconciled volume was written to the cache.
    Updated { total: Amount, source: VolumeSource },
    /// The ledger could not be read for this market; the cache is unchanged.
    Failed { reason: String },
}

/// One market's line in a volume resync.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResyncEntry {
    pub address: MarketAddress,
    #[serde(flatten)]
    pub result: ResyncResult,
}

/// Outcome of [`MarketService::resync_volumes`]. Entries are independent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResyncReport {
    pub entries: Vec<ResyncEntry>,
}

impl ResyncReport {
    #[must_use]
    pub fn updated(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e.result, ResyncResult::Updated { .. }))
            .count()
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.entries.len() - self.updated()
    }
}

/// Records accepted and rejected by an import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub imported: usize,
    /// One line per skipped record, naming its position and the reason.
    pub rejected: Vec<String>,
}

/// Read side of the market cache, merged with the ledger.
pub struct MarketService<M, L> {
    store: Arc<M>,
    ledger: Arc<LedgerReader<L>>,
    policy: VolumePolicy,
}

impl<M, L> MarketService<M, L>
where
    M: MarketStore,
    L: Ledger,
{
    #[must_use]
    pub fn new(store: Arc<M>, ledger: Arc<LedgerReader<L>>, policy: VolumePolicy) -> Self {
        Self {
            store,
            ledger,
            policy,
        }
    }

    /// Volume policy used for reconciliation and health buckets.
    #[must_use]
    pub fn policy(&self) -> &VolumePolicy {
        &self.policy
    }

    /// Merge cache and ledger for one market.
    ///
    /// A ledger outage degrades to the cached record tagged [`Freshness::Stale`].
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`] if neither source knows the address.
    /// - [`Error::UpstreamUnavailable`] if the ledger is down and nothing is cached.
    /// - [`Error::InvalidLedger`] if the ledger returned an inconsistent account.
    pub async fn get_market(&self, address: &MarketAddress) -> Result<MarketView> {
        let cached = self.store.get(address).await?;

        let (snapshot, freshness) = match self.ledger.read(address).await {
            Ok(snapshot) => (snapshot, Freshness::Live),
            Err(err) if err.is_retryable() && cached.is_some() => {
                warn!(market = %address, error = %err, "Ledger unavailable, serving cached market");
                (None, Freshness::Stale)
            }
            Err(err) => return Err(err),
        };

        let merged = merge(address, cached.as_ref(), snapshot.as_ref(), Utc::now())?;
        let escrow = match snapshot {
            Some(ref s) => s.escrow_balance,
            None => (merged.volume_source == VolumeSource::Escrow).then_some(merged.total_volume),
        };
        let market = volume::reconcile(&merged, escrow, &self.policy);

        Ok(MarketView { market, freshness })
    }

    /// List cached markets. Never touches the ledger.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub async fn list_markets(&self, filter: &MarketFilter) -> Result<Vec<Market>> {
        // Status is derived (pending resolution), so filter it after merging.
        let stored = MarketFilter {
            status: None,
            ..filter.clone()
        };
        let now = Utc::now();
        let mut markets = Vec::new();
        for cached in self.store.list(&stored).await? {
            let merged = merge(&cached.address, Some(&cached), None, now)?;
            let escrow =
                (merged.volume_source == VolumeSource::Escrow).then_some(merged.total_volume);
            let market = volume::reconcile(&merged, escrow, &self.policy);
            if filter.matches(&market) {
                markets.push(market);
            }
        }
        Ok(markets)
    }

    /// Pure volume reconciliation with this service's policy.
    #[must_use]
    pub fn reconcile_volume(&self, market: &Market, escrow_balance: Option<Amount>) -> Market {
        volume::reconcile(market, escrow_balance, &self.policy)
    }

    /// Re-read every cached market from the ledger and persist the
    /// reconciled volume. One market failing does not stop the others.
    ///
    /// # Errors
    ///
    /// Only fails if the market list itself cannot be read.
    pub async fn resync_volumes(&self) -> Result<ResyncReport> {
        let all = MarketFilter {
            include_test: true,
            ..MarketFilter::default()
        };
        let mut report = ResyncReport::default();
        for market in self.store.list(&all).await? {
            let address = market.address.clone();
            let result = match self.resync_one(&market).await {
                Ok(updated) => ResyncResult::Updated {
                    total: updated.total_volume,
                    source: updated.volume_source,
                },
                Err(err) => {
                    warn!(market = %address, error = %err, "Volume resync failed");
                    ResyncResult::Failed {
                        reason: err.to_string(),
                    }
                }
            };
            report.entries.push(ResyncEntry { address, result });
        }
        info!(
            updated = report.updated(),
            failed = report.failed(),
            "Volume resync complete"
        );
        Ok(report)
    }

    async fn resync_one(&self, cached: &Market) -> Result<Market> {
        let snapshot = self
            .ledger
            .read_fresh(&cached.address)
            .await?
            .ok_or_else(|| Error::NotFound(cached.address.clone()))?;

        let mut market = cached.clone();
        market.option_pools = fit_pools(snapshot.option_pools, market.options.len());
        let reconciled = volume::reconcile(&market, snapshot.escrow_balance, &self.policy);
        let stored = reconciled.for_persistence();
        self.store.upsert(&stored).await?;
        Ok(stored)
    }

    /// Volume health of active cached markets.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub async fn analyze_volumes(&self) -> Result<VolumeAnalysis> {
        let markets = self.store.list(&MarketFilter::default()).await?;
        Ok(volume::analyze(&markets, &self.policy))
    }

    /// Normalize and store imported records. Bad records are reported, not fatal.
    ///
    /// # Errors
    ///
    /// Returns an error if a store write fails.
    pub async fn import(&self, records: Vec<MarketRecord>) -> Result<ImportReport> {
        let mut report = ImportReport::default();
        for (i, record) in records.into_iter().enumerate() {
            match record.into_market() {
                Ok(market) => {
                    self.store.upsert(&market.for_persistence()).await?;
                    report.imported += 1;
                }
                Err(err) => {
                    warn!(record = i, error = %err, "Skipping market record");
                    report.rejected.push(format!("record {i}: {err}"));
                }
            }
        }
        info!(imported = report.imported, rejected = report.rejected.len(), "Markets imported");
        Ok(report)
    }
}
