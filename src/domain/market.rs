//! Market-related domain types.
//!
//! - [`Market`] - A canonical prediction market record with 2-4 outcomes
//! - [`MarketStatus`] - Lifecycle state of a market
//! - [`VolumeSource`] - Which source the displayed total volume came from
//! - [`MarketFilter`] - Criteria for listing cached markets

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::{MarketAddress, TournamentId, WalletAddress};
use super::money::Amount;

/// Address prefix used by seeded test markets that listings hide by default.
pub const TEST_MARKET_PREFIX: &str = "test-market";

/// Lifecycle state of a market.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarketStatus {
    #[default]
    Active,
    /// Betting closed, ledger has not recorded an outcome yet.
    PendingResolution,
    Resolved,
    Cancelled,
}

impl MarketStatus {
    /// Canonical string form, as stored in the cache.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            MarketStatus::Active => "Active",
            MarketStatus::PendingResolution => "PendingResolution",
            MarketStatus::Resolved => "Resolved",
            MarketStatus::Cancelled => "Cancelled",
        }
    }

    /// Map the ledger's numeric status code.
    #[must_use]
    pub const fn from_ledger_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(MarketStatus::Active),
            1 => Some(MarketStatus::Resolved),
            2 => Some(MarketStatus::Cancelled),
            _ => None,
        }
    }

    /// Active or pending: still awaiting an outcome.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        matches!(self, MarketStatus::Active | MarketStatus::PendingResolution)
    }
}

impl fmt::Display for MarketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MarketStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(MarketStatus::Active),
            "pendingresolution" | "pending_resolution" | "pending" => {
                Ok(MarketStatus::PendingResolution)
            }
            "resolved" => Ok(MarketStatus::Resolved),
            "cancelled" | "canceled" => Ok(MarketStatus::Cancelled),
            other => Err(format!("unknown market status: {other}")),
        }
    }
}

/// Where a market's `total_volume` came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VolumeSource {
    /// Sum of the per-option pools.
    #[default]
    Pools,
    /// Escrow token balance, the ground truth for funds held.
    Escrow,
    /// Display-only placeholder for empty active markets. Never ledger truth.
    Fallback,
}

impl VolumeSource {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            VolumeSource::Pools => "pools",
            VolumeSource::Escrow => "escrow",
            VolumeSource::Fallback => "fallback",
        }
    }
}

impl fmt::Display for VolumeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VolumeSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pools" => Ok(VolumeSource::Pools),
            "escrow" => Ok(VolumeSource::Escrow),
            "fallback" => Ok(VolumeSource::Fallback),
            other => Err(format!("unknown volume source: {other}")),
        }
    }
}

/// Canonical market record shared by every component.
///
/// Produced by the normalizer from cache and ledger payloads; nothing
/// downstream accepts raw external shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Market {
    pub address: MarketAddress,
    pub question: String,
    pub category: String,
    /// Ordered outcome labels (2-4 once deployed).
    pub options: Vec<String>,
    /// Accumulated stake per option, same length as `options`.
    pub option_pools: Vec<Amount>,
    pub total_volume: Amount,
    pub status: MarketStatus,
    /// Winning option index. Write-once.
    pub resolved_option: Option<u8>,
    pub resolution_date: Option<DateTime<Utc>>,
    pub min_bet_amount: Amount,
    pub creator_fee_bps: u32,
    pub volume_source: VolumeSource,
    pub tournament_id: Option<TournamentId>,
    pub creator: Option<WalletAddress>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Market {
    /// Create an active market with zeroed pools.
    pub fn new(address: MarketAddress, question: impl Into<String>, options: Vec<String>) -> Self {
        let option_pools = vec![Decimal::ZERO; options.len()];
        Self {
            address,
            question: question.into(),
            category: String::new(),
            options,
            option_pools,
            total_volume: Decimal::ZERO,
            status: MarketStatus::Active,
            resolved_option: None,
            resolution_date: None,
            min_bet_amount: Decimal::ZERO,
            creator_fee_bps: 0,
            volume_source: VolumeSource::Pools,
            tournament_id: None,
            creator: None,
            created_at: None,
        }
    }

    /// Sum of all option pools.
    #[must_use]
    pub fn pool_sum(&self) -> Amount {
        self.option_pools.iter().copied().sum()
    }

    /// Stake recorded against one option (zero when out of range).
    #[must_use]
    pub fn pool(&self, option_index: u8) -> Amount {
        self.option_pools
            .get(usize::from(option_index))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// Pool of the resolved option, if the market is resolved.
    #[must_use]
    pub fn winning_pool(&self) -> Option<Amount> {
        self.resolved_option.map(|idx| self.pool(idx))
    }

    /// Returns true if the market is resolved.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.status == MarketStatus::Resolved
    }

    /// The volume that may back payouts.
    ///
    /// A fallback display value is never money; the pool sum stands in.
    #[must_use]
    pub fn settlement_volume(&self) -> Amount {
        match self.volume_source {
            VolumeSource::Pools | VolumeSource::Escrow => self.total_volume,
            VolumeSource::Fallback => self.pool_sum(),
        }
    }

    /// Copy suitable for writing to the cache: fallback volume is dropped.
    #[must_use]
    pub fn for_persistence(&self) -> Self {
        let mut market = self.clone();
        if market.volume_source == VolumeSource::Fallback {
            market.total_volume = market.pool_sum();
            market.volume_source = VolumeSource::Pools;
        }
        market
    }

    /// Implied probability per option in percent.
    ///
    /// Splits evenly when nothing has been staked yet.
    #[must_use]
    pub fn option_percentages(&self) -> Vec<Decimal> {
        let total = self.pool_sum();
        if self.options.is_empty() {
            return Vec::new();
        }
        if total.is_zero() {
            let even = Decimal::ONE_HUNDRED / Decimal::from(self.options.len());
            return vec![even; self.options.len()];
        }
        self.option_pools
            .iter()
            .map(|pool| pool / total * Decimal::ONE_HUNDRED)
            .collect()
    }

    /// True for seeded test markets hidden from listings.
    #[must_use]
    pub fn is_test_market(&self) -> bool {
        self.address.as_str().starts_with(TEST_MARKET_PREFIX)
    }
}

/// Criteria for listing cached markets. Empty filter matches all
/// non-test markets.
#[derive(Debug, Clone, Default)]
pub struct MarketFilter {
    pub status: Option<MarketStatus>,
    pub category: Option<String>,
    pub tournament_id: Option<TournamentId>,
    pub include_test: bool,
}

impl MarketFilter {
    /// Markets in a single status.
    #[must_use]
    pub fn with_status(status: MarketStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// Markets linked to a tournament.
    #[must_use]
    pub fn for_tournament(tournament_id: TournamentId) -> Self {
        Self {
            tournament_id: Some(tournament_id),
            ..Self::default()
        }
    }

    /// Check whether a market passes this filter.
    #[must_use]
    pub fn matches(&self, market: &Market) -> bool {
        if !self.include_test && market.is_test_market() {
            return false;
        }
        if let Some(status) = self.status {
            if market.status != status {
                return false;
            }
        }
        if let Some(ref category) = self.category {
            if !market.category.eq_ignore_ascii_case(category) {
                return false;
            }
        }
        if let Some(ref tournament) = self.tournament_id {
            if market.tournament_id.as_ref() != Some(tournament) {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn binary_market() -> Market {
        let mut market = Market::new(
            MarketAddress::from("m1"),
            "Will it rain?",
            vec!["Yes".into(), "No".into()],
        );
        market.option_pools = vec![dec!(600), dec!(400)];
        market.total_volume = dec!(1000);
        market
    }

    #[test]
    fn new_market_has_zeroed_pools_matching_options() {
        let market = Market::new(
            MarketAddress::from("m1"),
            "Q?",
            vec!["A".into(), "B".into(), "C".into()],
        );
        assert_eq!(market.option_pools.len(), 3);
        assert_eq!(market.pool_sum(), Decimal::ZERO);
        assert_eq!(market.status, MarketStatus::Active);
    }

    #[test]
    fn pool_out_of_range_is_zero() {
        let market = binary_market();
        assert_eq!(market.pool(0), dec!(600));
        assert_eq!(market.pool(7), Decimal::ZERO);
    }

    #[test]
    fn percentages_follow_pools() {
        let market = binary_market();
        assert_eq!(market.option_percentages(), vec![dec!(60), dec!(40)]);
    }

    #[test]
    fn percentages_split_evenly_without_volume() {
        let market = Market::new(
            MarketAddress::from("m1"),
            "Q?",
            vec!["A".into(), "B".into(), "C".into(), "D".into()],
        );
        assert_eq!(market.option_percentages(), vec![dec!(25); 4]);
    }

    #[test]
    fn fallback_volume_never_backs_settlement_or_persistence() {
        let mut market = binary_market();
        market.option_pools = vec![Decimal::ZERO, Decimal::ZERO];
        market.total_volume = dec!(10);
        market.volume_source = VolumeSource::Fallback;

        assert_eq!(market.settlement_volume(), Decimal::ZERO);
        let stored = market.for_persistence();
        assert_eq!(stored.total_volume, Decimal::ZERO);
        assert_eq!(stored.volume_source, VolumeSource::Pools);
    }

    #[test]
    fn escrow_volume_backs_settlement() {
        let mut market = binary_market();
        market.total_volume = dec!(1050);
        market.volume_source = VolumeSource::Escrow;
        assert_eq!(market.settlement_volume(), dec!(1050));
    }

    #[test]
    fn status_parses_loosely_and_maps_ledger_codes() {
        assert_eq!("resolved".parse::<MarketStatus>(), Ok(MarketStatus::Resolved));
        assert_eq!("Canceled".parse::<MarketStatus>(), Ok(MarketStatus::Cancelled));
        assert!("bogus".parse::<MarketStatus>().is_err());
        assert_eq!(MarketStatus::from_ledger_code(1), Some(MarketStatus::Resolved));
        assert_eq!(MarketStatus::from_ledger_code(9), None);
    }

    #[test]
    fn filter_hides_test_markets_by_default() {
        let mut market = binary_market();
        market.address = MarketAddress::from("test-market-1");

        assert!(!MarketFilter::default().matches(&market));
        let filter = MarketFilter {
            include_test: true,
            ..MarketFilter::default()
        };
        assert!(filter.matches(&market));
    }

    #[test]
    fn filter_matches_status_category_and_tournament() {
        let mut market = binary_market();
        market.category = "Sports".into();
        market.tournament_id = Some(TournamentId::from("cwc"));

        assert!(MarketFilter::with_status(MarketStatus::Active).matches(&market));
        assert!(!MarketFilter::with_status(MarketStatus::Resolved).matches(&market));
        assert!(MarketFilter::for_tournament(TournamentId::from("cwc")).matches(&market));
        assert!(!MarketFilter::for_tournament(TournamentId::from("nba")).matches(&market));

        let filter = MarketFilter {
            category: Some("sports".into()),
            ..MarketFilter::default()
        };
        assert!(filter.matches(&market));
    }
}
