//! Authoritative total-volume selection.
//!
//! Stakes land in two stores that are updated independently: the escrow
//! token account and the per-option counters. During confirmation delay they
//! drift. Escrow wins when readable; otherwise the pool sum is used; an
//! empty active market may show a display-only placeholder.

use rust_decimal::Decimal;
use serde::Serialize;

use super::id::MarketAddress;
use super::market::{Market, MarketStatus, VolumeSource};
use super::money::Amount;

/// Knobs for volume reconciliation and health analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumePolicy {
    /// Placeholder shown for empty active markets. `None` uses the market's
    /// own minimum bet.
    pub fallback_display: Option<Amount>,
    /// Markets below this total are reported as low-volume.
    pub low_volume_threshold: Amount,
}

impl Default for VolumePolicy {
    fn default() -> Self {
        Self {
            fallback_display: None,
            low_volume_threshold: Decimal::ONE_HUNDRED,
        }
    }
}

/// Decide a market's displayed total volume.
///
/// Pure: the returned market is a new value. A [`VolumeSource::Fallback`]
/// result must not be persisted; see [`Market::for_persistence`].
#[must_use]
pub fn reconcile(market: &Market, escrow_balance: Option<Amount>, policy: &VolumePolicy) -> Market {
    let mut market = market.clone();

    if let Some(balance) = escrow_balance.filter(|b| *b >= Decimal::ZERO) {
        market.total_volume = balance;
        market.volume_source = VolumeSource::Escrow;
        return market;
    }

    market.total_volume = market.pool_sum();
    market.volume_source = VolumeSource::Pools;

    if market.status == MarketStatus::Active && market.total_volume.is_zero() {
        let placeholder = policy.fallback_display.unwrap_or(market.min_bet_amount);
        if placeholder > Decimal::ZERO {
            market.total_volume = placeholder;
            market.volume_source = VolumeSource::Fallback;
        }
    }

    market
}

/// Health bucket of an active market's volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VolumeHealth {
    Zero,
    Low,
    Normal,
}

/// Read-only volume health report over active markets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VolumeAnalysis {
    pub total: usize,
    pub zero_volume: usize,
    pub low_volume: usize,
    pub normal_volume: usize,
    /// Markets whose cached volume should be resynced.
    pub needs_sync: Vec<MarketAddress>,
}

/// Classify one market's ledger-backed volume.
#[must_use]
pub fn classify(market: &Market, policy: &VolumePolicy) -> VolumeHealth {
    let volume = market.settlement_volume();
    if volume.is_zero() {
        VolumeHealth::Zero
    } else if volume < policy.low_volume_threshold {
        VolumeHealth::Low
    } else {
        VolumeHealth::Normal
    }
}

/// Bucket every active market by volume.
#[must_use]
pub fn analyze<'a>(markets: impl IntoIterator<Item = &'a Market>, policy: &VolumePolicy) -> VolumeAnalysis {
    let mut analysis = VolumeAnalysis::default();
    for market in markets
        .into_iter()
        .filter(|m| m.status == MarketStatus::Active)
    {
        analysis.total += 1;
        match classify(market, policy) {
            VolumeHealth::Zero => {
                analysis.zero_volume += 1;
                analysis.needs_sync.push(market.address.clone());
            }
            VolumeHealth::Low => analysis.low_volume += 1,
            VolumeHealth::Normal => analysis.normal_volume += 1,
        }
    }
    analysis
}
