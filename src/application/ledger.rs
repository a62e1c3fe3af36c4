//! Cached, retried access to the authoritative ledger.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use super::cache::TtlCache;
use super::retry::RetryPolicy;
use crate::domain::id::MarketAddress;
use crate::domain::ledger::LedgerSnapshot;
use crate::error::Result;
use crate::port::outbound::ledger::Ledger;

/// Wraps a [`Ledger`] with a TTL cache and bounded retries.
pub struct LedgerReader<L> {
    ledger: Arc<L>,
    snapshots: TtlCache<MarketAddress, LedgerSnapshot>,
    retry: RetryPolicy,
}

impl<L: Ledger> LedgerReader<L> {
    #[must_use]
    pub fn new(ledger: Arc<L>, ttl: Duration, retry: RetryPolicy) -> Self {
        Self {
            ledger,
            snapshots: TtlCache::new(ttl),
            retry,
        }
    }

    /// Read through the cache.
    ///
    /// # Errors
    ///
    /// Returns the last ledger error once retries are exhausted.
    pub async fn read(&self, address: &MarketAddress) -> Result<Option<LedgerSnapshot>> {
        if let Some(snapshot) = self.snapshots.get(address) {
            debug!(market = %address, "Ledger cache hit");
            return Ok(Some(snapshot));
        }
        debug!(market = %address, "Ledger cache miss");
        self.read_fresh(address).await
    }

    /// Bypass the cache and refresh it with the result.
    ///
    /// # Errors
    ///
    /// Returns the last ledger error once retries are exhausted.
    pub async fn read_fresh(&self, address: &MarketAddress) -> Result<Option<LedgerSnapshot>> {
        let snapshot = self
            .retry
            .run("ledger_read", || self.ledger.read(address))
            .await?;
        match snapshot {
            Some(ref snapshot) => self.snapshots.insert(address.clone(), snapshot.clone()),
            None => self.snapshots.invalidate(address),
        }
        Ok(snapshot)
    }
}
