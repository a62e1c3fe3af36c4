//! Persistence ports for cached markets and positions.

use std::future::Future;

use chrono::{DateTime, Utc};

use crate::domain::id::{MarketAddress, WalletAddress};
use crate::domain::market::{Market, MarketFilter, MarketStatus, VolumeSource};
use crate::domain::money::Amount;
use crate::domain::position::{Position, PositionKey};
use crate::error::Result;

/// Result of a conditional resolution write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionWrite {
    /// The option was recorded by this call.
    Applied,
    /// An option was already recorded; carries the stored value.
    AlreadySet(u8),
    /// The market is closed without an outcome and was left untouched.
    Closed(MarketStatus),
}

/// Winning option plus the settlement inputs read in the same ledger snapshot.
///
/// Claims are computed from the cached row, so the pools and volume must be
/// stored together with the outcome they settle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionRecord {
    pub option: u8,
    pub option_pools: Vec<Amount>,
    pub total_volume: Amount,
    pub volume_source: VolumeSource,
}

/// Storage operations for cached markets.
pub trait MarketStore: Send + Sync {
    /// Get a market by address.
    fn get(&self, address: &MarketAddress) -> impl Future<Output = Result<Option<Market>>> + Send;

    /// List markets matching a filter, newest first.
    fn list(&self, filter: &MarketFilter) -> impl Future<Output = Result<Vec<Market>>> + Send;

    /// Save a market, replacing if it exists.
    ///
    /// A resolution already stored is never cleared or changed by this call.
    fn upsert(&self, market: &Market) -> impl Future<Output = Result<()>> + Send;

    /// Insert a market that must not exist yet.
    ///
    /// Fails with [`crate::error::Error::DuplicateMarket`] otherwise.
    fn insert_new(&self, market: &Market) -> impl Future<Output = Result<()>> + Send;

    /// Record the winning option, pools and volume only if no option is
    /// stored yet and the market is not cancelled. The status becomes
    /// resolved in the same write.
    ///
    /// Fails with [`crate::error::Error::NotFound`] for an unknown address.
    fn record_resolution(
        &self,
        address: &MarketAddress,
        record: &ResolutionRecord,
    ) -> impl Future<Output = Result<ResolutionWrite>> + Send;
}

/// Storage operations for staked positions.
pub trait PositionStore: Send + Sync {
    /// Get a position by key.
    fn get(&self, key: &PositionKey) -> impl Future<Output = Result<Option<Position>>> + Send;

    /// All positions on one market.
    fn list_for_market(
        &self,
        market: &MarketAddress,
    ) -> impl Future<Output = Result<Vec<Position>>> + Send;

    /// All positions held by one wallet.
    fn list_for_owner(
        &self,
        owner: &WalletAddress,
    ) -> impl Future<Output = Result<Vec<Position>>> + Send;

    /// Save a position, replacing if it exists. Claimed positions are left
    /// untouched.
    fn upsert(&self, position: &Position) -> impl Future<Output = Result<()>> + Send;

    /// Set `claimed`, `payout` and `claimed_at` only where `claimed` is false.
    ///
    /// Returns true if this call flipped the flag.
    fn mark_claimed(
        &self,
        key: &PositionKey,
        payout: Amount,
        claimed_at: DateTime<Utc>,
    ) -> impl Future<Output = Result<bool>> + Send;
}
