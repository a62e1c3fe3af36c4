//! Authoritative ledger read port.

use std::future::Future;

use crate::domain::id::MarketAddress;
use crate::domain::ledger::LedgerSnapshot;
use crate::error::Result;

/// Read-only view of the on-chain market accounts.
///
/// Reads are idempotent and safe to retry. A momentarily unavailable ledger
/// must surface as [`crate::error::Error::UpstreamUnavailable`].
pub trait Ledger: Send + Sync {
    /// Read one market. `Ok(None)` when the ledger has no such account.
    fn read(
        &self,
        address: &MarketAddress,
    ) -> impl Future<Output = Result<Option<LedgerSnapshot>>> + Send;
}
