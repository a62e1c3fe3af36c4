//! In-memory market and position stores.
//!
//! Same semantics as the SQLite adapter, including the conditional writes.
//! Used by tests and by embedders that bring their own persistence.

use std::cmp::Reverse;
use std::collections::HashMap;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::domain::id::{MarketAddress, WalletAddress};
use crate::domain::market::{Market, MarketFilter, MarketStatus};
use crate::domain::money::Amount;
use crate::domain::position::{Position, PositionKey};
use crate::error::{Error, Result};
use crate::port::outbound::store::{MarketStore, PositionStore, ResolutionRecord, ResolutionWrite};

#[derive(Default)]
pub struct MemoryMarketStore {
    markets: RwLock<HashMap<MarketAddress, Market>>,
}

impl MemoryMarketStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with markets, bypassing the write guards.
    #[must_use]
    pub fn with_markets(markets: impl IntoIterator<Item = Market>) -> Self {
        let store = Self::new();
        {
            let mut guard = store.markets.write();
            for market in markets {
                guard.insert(market.address.clone(), market);
            }
        }
        store
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.markets.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl MarketStore for MemoryMarketStore {
    async fn get(&self, address: &MarketAddress) -> Result<Option<Market>> {
        Ok(self.markets.read().get(address).cloned())
    }

    async fn list(&self, filter: &MarketFilter) -> Result<Vec<Market>> {
        let mut markets: Vec<Market> = self
            .markets
            .read()
            .values()
            .filter(|m| filter.matches(m))
            .cloned()
            .collect();
        markets.sort_by_key(|m| (Reverse(m.created_at), m.address.clone()));
        Ok(markets)
    }

    async fn upsert(&self, market: &Market) -> Result<()> {
        let mut markets = self.markets.write();
        let mut market = market.clone();
        if let Some(existing) = markets.get(&market.address) {
            if let Some(option) = existing.resolved_option {
                market.resolved_option = Some(option);
                market.status = MarketStatus::Resolved;
            }
        }
        markets.insert(market.address.clone(), market);
        Ok(())
    }

    async fn insert_new(&self, market: &Market) -> Result<()> {
        let mut markets = self.markets.write();
        if markets.contains_key(&market.address) {
            return Err(Error::DuplicateMarket(market.address.clone()));
        }
        markets.insert(market.address.clone(), market.clone());
        Ok(())
    }

    async fn record_resolution(
        &self,
        address: &MarketAddress,
        record: &ResolutionRecord,
    ) -> Result<ResolutionWrite> {
        let mut markets = self.markets.write();
        let market = markets
            .get_mut(address)
            .ok_or_else(|| Error::NotFound(address.clone()))?;
        if let Some(existing) = market.resolved_option {
            return Ok(ResolutionWrite::AlreadySet(existing));
        }
        if market.status == MarketStatus::Cancelled {
            return Ok(ResolutionWrite::Closed(market.status));
        }
        market.resolved_option = Some(record.option);
        market.status = MarketStatus::Resolved;
        market.option_pools.clone_from(&record.option_pools);
        market.total_volume = record.total_volume;
        market.volume_source = record.volume_source;
        Ok(ResolutionWrite::Applied)
    }
}

#[derive(Default)]
pub struct MemoryPositionStore {
    positions: RwLock<HashMap<PositionKey, Position>>,
}

impl MemoryPositionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_positions(positions: impl IntoIterator<Item = Position>) -> Self {
        let store = Self::new();
        {
            let mut guard = store.positions.write();
            for position in positions {
                guard.insert(position.key.clone(), position);
            }
        }
        store
    }
}

impl PositionStore for MemoryPositionStore {
    async fn get(&self, key: &PositionKey) -> Result<Option<Position>> {
        Ok(self.positions.read().get(key).cloned())
    }

    async fn list_for_market(&self, market: &MarketAddress) -> Result<Vec<Position>> {
        let mut positions: Vec<Position> = self
            .positions
            .read()
            .values()
            .filter(|p| p.market() == market)
            .cloned()
            .collect();
        positions.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(positions)
    }

    async fn list_for_owner(&self, owner: &WalletAddress) -> Result<Vec<Position>> {
        let mut positions: Vec<Position> = self
            .positions
            .read()
            .values()
            .filter(|p| p.owner() == owner)
            .cloned()
            .collect();
        positions.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(positions)
    }

    async fn upsert(&self, position: &Position) -> Result<()> {
        let mut positions = self.positions.write();
        if positions.get(&position.key).is_some_and(|p| p.claimed) {
            return Ok(());
        }
        positions.insert(position.key.clone(), position.clone());
        Ok(())
    }

    async fn mark_claimed(
        &self,
        key: &PositionKey,
        payout: Amount,
        claimed_at: DateTime<Utc>,
    ) -> Result<bool> {
        let mut positions = self.positions.write();
        let Some(position) = positions.get_mut(key) else {
            return Err(Error::PositionNotFound(key.clone()));
        };
        if position.claimed {
            return Ok(false);
        }
        position.claimed = true;
        position.payout = Some(payout);
        position.claimed_at = Some(claimed_at);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::market::VolumeSource;
    use rust_decimal_macros::dec;

    fn market(addr: &str) -> Market {
        Market::new(MarketAddress::from(addr), "Q", vec!["A".into(), "B".into()])
    }

    fn resolution(option: u8) -> ResolutionRecord {
        ResolutionRecord {
            option,
            option_pools: vec![dec!(600), dec!(400)],
            total_volume: dec!(1000),
            volume_source: VolumeSource::Escrow,
        }
    }

    #[tokio::test]
    async fn record_resolution_is_write_once() {
        let store = MemoryMarketStore::with_markets([market("m1")]);
        let addr = MarketAddress::from("m1");

        assert_eq!(
            store.record_resolution(&addr, &resolution(1)).await.unwrap(),
            ResolutionWrite::Applied
        );
        assert_eq!(
            store.record_resolution(&addr, &resolution(0)).await.unwrap(),
            ResolutionWrite::AlreadySet(1)
        );
        let stored = store.get(&addr).await.unwrap().unwrap();
        assert_eq!(stored.status, MarketStatus::Resolved);
        assert_eq!(stored.resolved_option, Some(1));
        assert_eq!(stored.option_pools, vec![dec!(600), dec!(400)]);
        assert_eq!(stored.total_volume, dec!(1000));
        assert_eq!(stored.volume_source, VolumeSource::Escrow);
    }

    #[tokio::test]
    async fn cancelled_market_refuses_resolution() {
        let mut cancelled = market("m1");
        cancelled.status = MarketStatus::Cancelled;
        let store = MemoryMarketStore::with_markets([cancelled]);
        let addr = MarketAddress::from("m1");

        assert_eq!(
            store.record_resolution(&addr, &resolution(1)).await.unwrap(),
            ResolutionWrite::Closed(MarketStatus::Cancelled)
        );
        let stored = store.get(&addr).await.unwrap().unwrap();
        assert_eq!(stored.status, MarketStatus::Cancelled);
        assert_eq!(stored.resolved_option, None);
    }

    #[tokio::test]
    async fn upsert_keeps_recorded_resolution() {
        let store = MemoryMarketStore::with_markets([market("m1")]);
        let addr = MarketAddress::from("m1");
        store.record_resolution(&addr, &resolution(1)).await.unwrap();

        store.upsert(&market("m1")).await.unwrap();
        let stored = store.get(&addr).await.unwrap().unwrap();
        assert_eq!(stored.resolved_option, Some(1));
    }

    #[tokio::test]
    async fn insert_new_rejects_existing_address() {
        let store = MemoryMarketStore::new();
        store.insert_new(&market("m1")).await.unwrap();
        assert!(matches!(
            store.insert_new(&market("m1")).await,
            Err(Error::DuplicateMarket(_))
        ));
    }

    #[tokio::test]
    async fn mark_claimed_flips_once() {
        let key = PositionKey::new(MarketAddress::from("m1"), WalletAddress::from("w1"), 0);
        let store = MemoryPositionStore::with_positions([Position::new(key.clone(), dec!(60))]);
        let now = Utc::now();

        assert!(store.mark_claimed(&key, dec!(95.5), now).await.unwrap());
        assert!(!store.mark_claimed(&key, dec!(95.5), now).await.unwrap());
        let stored = store.get(&key).await.unwrap().unwrap();
        assert!(stored.claimed);
        assert_eq!(stored.payout, Some(dec!(95.5)));
    }
}
