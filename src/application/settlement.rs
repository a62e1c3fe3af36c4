//! Payout previews, claims and wallet statistics.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::lock::KeyedLocks;
use crate::domain::id::{MarketAddress, WalletAddress};
use crate::domain::market::{Market, MarketStatus};
use crate::domain::money::Amount;
use crate::domain::position::{ClaimReceipt, Position, PositionKey};
use crate::domain::settlement::{self, Payout, SettlementSummary};
use crate::error::{Error, Result};
use crate::port::outbound::store::{MarketStore, PositionStore};

/// Result of a claim attempt that did not fail.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ClaimOutcome {
    /// The payout was written; the receipt is what was recorded.
    Claimed(ClaimReceipt),
    /// The position backed a losing option; nothing was written.
    NotWinning,
}

/// Aggregate performance of one wallet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WalletStats {
    pub owner: WalletAddress,
    pub positions: usize,
    pub total_staked: Amount,
    pub won: usize,
    pub lost: usize,
    pub open: usize,
    pub claimed_payouts: Amount,
    /// Claimed payouts minus stakes placed on resolved markets.
    pub realized_profit: Amount,
}

/// A stake to record, as supplied by an import file.
#[derive(Debug, Clone, Deserialize)]
pub struct StakeRecord {
    #[serde(alias = "marketAddress", alias = "market_address")]
    pub market: String,
    #[serde(alias = "user", alias = "wallet")]
    pub owner: String,
    #[serde(alias = "optionIndex", alias = "option_index", alias = "option")]
    pub option_index: u8,
    pub amount: Decimal,
}

/// Settlement use cases over the cached market and position stores.
pub struct SettlementService<M, P> {
    markets: Arc<M>,
    positions: Arc<P>,
    locks: KeyedLocks<PositionKey>,
}

impl<M, P> SettlementService<M, P>
where
    M: MarketStore,
    P: PositionStore,
{
    #[must_use]
    pub fn new(markets: Arc<M>, positions: Arc<P>) -> Self {
        Self {
            markets,
            positions,
            locks: KeyedLocks::new(),
        }
    }

    /// Positions with a claim lock entry right now.
    #[must_use]
    pub fn tracked_locks(&self) -> usize {
        self.locks.len()
    }

    /// Pure payout calculation. Safe to call any number of times.
    ///
    /// # Errors
    ///
    /// See [`settlement::compute_payout`].
    pub fn compute_payout(&self, market: &Market, position: &Position) -> Result<Payout> {
        settlement::compute_payout(market, position)
    }

    /// Load a position and preview its payout.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] or [`Error::PositionNotFound`] for unknown
    /// keys, otherwise as [`settlement::compute_payout`].
    pub async fn preview(&self, key: &PositionKey) -> Result<Payout> {
        let (market, position) = self.load(key).await?;
        settlement::compute_payout(&market, &position)
    }

    async fn load(&self, key: &PositionKey) -> Result<(Market, Position)> {
        let market = self
            .markets
            .get(&key.market)
            .await?
            .ok_or_else(|| Error::NotFound(key.market.clone()))?;
        let position = self
            .positions
            .get(key)
            .await?
            .ok_or_else(|| Error::PositionNotFound(key.clone()))?;
        Ok((market, position))
    }

    /// Pay out a winning position exactly once.
    ///
    /// Claims on the same key are serialized, and the store write only
    /// succeeds while the position is still unclaimed.
    ///
    /// # Errors
    ///
    /// - [`Error::NotResolved`] if the market has no outcome yet.
    /// - [`Error::AlreadyClaimed`] on any second claim.
    /// - [`Error::NotFound`] / [`Error::PositionNotFound`] for unknown keys.
    /// - [`Error::Settlement`] if the payout cannot be computed.
    pub async fn claim(&self, key: &PositionKey) -> Result<ClaimOutcome> {
        self.locks.run(key, self.claim_locked(key)).await
    }

    async fn claim_locked(&self, key: &PositionKey) -> Result<ClaimOutcome> {
        let (market, position) = self.load(key).await?;
        let payout = settlement::compute_payout(&market, &position)?;
        if !payout.claimable {
            return Ok(ClaimOutcome::NotWinning);
        }

        let claimed_at = Utc::now();
        if !self.positions.mark_claimed(key, payout.net, claimed_at).await? {
            warn!(position = %key, "Claim lost the race, position already claimed");
            return Err(Error::AlreadyClaimed(key.clone()));
        }

        info!(
            position = %key,
            net = %payout.net,
            platform_fee = %payout.platform_fee,
            creator_fee = %payout.creator_fee,
            "Claim written"
        );
        Ok(ClaimOutcome::Claimed(ClaimReceipt {
            key: key.clone(),
            payout,
            claimed_at,
        }))
    }

    /// Distribution preview across every position of a market.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] or [`Error::NotResolved`].
    pub async fn summarize(&self, address: &MarketAddress) -> Result<SettlementSummary> {
        let market = self
            .markets
            .get(address)
            .await?
            .ok_or_else(|| Error::NotFound(address.clone()))?;
        let positions = self.positions.list_for_market(address).await?;
        settlement::summarize(&market, &positions)
    }

    /// Every position staked on a market.
    ///
    /// # Errors
    ///
    /// Returns an error if the position store cannot be read.
    pub async fn positions(&self, address: &MarketAddress) -> Result<Vec<Position>> {
        self.positions.list_for_market(address).await
    }

    /// Record a new stake against a cached market.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] for unknown markets, [`Error::Parse`] for an
    /// option index outside the market or a non-positive amount.
    pub async fn record_stake(&self, record: StakeRecord) -> Result<Position> {
        let address = MarketAddress::from(record.market);
        let market = self
            .markets
            .get(&address)
            .await?
            .ok_or_else(|| Error::NotFound(address.clone()))?;
        if usize::from(record.option_index) >= market.options.len() {
            return Err(Error::Parse(format!(
                "option {} out of range for market {address}",
                record.option_index
            )));
        }
        if record.amount <= Decimal::ZERO {
            return Err(Error::Parse(format!("stake amount must be positive: {}", record.amount)));
        }

        let key = PositionKey::new(address, WalletAddress::from(record.owner), record.option_index);
        let position = Position::new(key, record.amount);
        self.positions.upsert(&position).await?;
        Ok(position)
    }

    /// Staking and claim history of one wallet.
    ///
    /// # Errors
    ///
    /// Returns an error if the stores cannot be read.
    pub async fn wallet_stats(&self, owner: &WalletAddress) -> Result<WalletStats> {
        let positions = self.positions.list_for_owner(owner).await?;
        let mut markets: HashMap<MarketAddress, Option<Market>> = HashMap::new();
        let mut stats = WalletStats {
            owner: owner.clone(),
            positions: positions.len(),
            ..WalletStats::default()
        };

        for position in &positions {
            if !markets.contains_key(position.market()) {
                let market = self.markets.get(position.market()).await?;
                markets.insert(position.market().clone(), market);
            }
            stats.total_staked += position.amount;
            if let Some(payout) = position.payout.filter(|_| position.claimed) {
                stats.claimed_payouts += payout;
            }

            let resolved = markets
                .get(position.market())
                .and_then(Option::as_ref)
                .filter(|m| m.status == MarketStatus::Resolved)
                .and_then(|m| m.resolved_option);
            match resolved {
                Some(winner) if winner == position.option_index() => {
                    stats.won += 1;
                    stats.realized_profit -= position.amount;
                }
                Some(_) => {
                    stats.lost += 1;
                    stats.realized_profit -= position.amount;
                }
                None => stats.open += 1,
            }
        }
        stats.realized_profit += stats.claimed_payouts;
        Ok(stats)
    }
}
