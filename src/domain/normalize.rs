//! Canonicalization of heterogeneous market payloads.
//!
//! Cached rows and imported records arrive with mixed naming conventions
//! and arbitrary missing fields. [`MarketRecord`] accepts all of them;
//! [`MarketRecord::into_market`] and [`merge`] produce the one canonical
//! [`Market`] shape. Missing numbers become zero, never absent.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::warn;

use super::id::{MarketAddress, TournamentId, WalletAddress};
use super::ledger::LedgerSnapshot;
use super::market::{Market, MarketStatus, VolumeSource};
use super::money::{Amount, MAX_CREATOR_FEE_BPS};
use crate::error::{Error, Result};

/// Option label as either a bare string or an object with a `label`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OptionLabel {
    Plain(String),
    Detailed { label: String },
}

impl OptionLabel {
    fn into_string(self) -> String {
        match self {
            OptionLabel::Plain(label) | OptionLabel::Detailed { label } => label,
        }
    }
}

/// Loosely-typed market payload from the cache or an import file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MarketRecord {
    #[serde(alias = "marketAddress", alias = "publicKey", alias = "address")]
    pub market_address: Option<String>,
    pub question: Option<String>,
    pub category: Option<String>,
    pub options: Vec<OptionLabel>,
    #[serde(alias = "optionPools", alias = "option_pools", alias = "optionVolumes")]
    pub option_volumes: Vec<Option<Decimal>>,
    #[serde(alias = "totalVolume")]
    pub total_volume: Option<Decimal>,
    #[serde(alias = "volumeSource")]
    pub volume_source: Option<String>,
    pub status: Option<String>,
    #[serde(
        alias = "resolvedOption",
        alias = "winningOption",
        alias = "resolvedOptionIndex"
    )]
    pub resolved_option: Option<u8>,
    #[serde(alias = "resolutionDate")]
    pub resolution_date: Option<DateTime<Utc>>,
    #[serde(alias = "minBetAmount", alias = "min_bet_amount")]
    pub min_bet: Option<Decimal>,
    #[serde(alias = "creatorFeeRateBps", alias = "creatorFeeRate", alias = "creator_fee_bps")]
    pub creator_fee_rate: Option<u32>,
    #[serde(alias = "tournamentId")]
    pub tournament_id: Option<String>,
    pub creator: Option<String>,
    #[serde(alias = "createdAt")]
    pub created_at: Option<DateTime<Utc>>,
}

impl MarketRecord {
    /// Convert into the canonical shape.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] when the record carries no address or a
    /// creator fee above [`MAX_CREATOR_FEE_BPS`].
    pub fn into_market(self) -> Result<Market> {
        let address = self
            .market_address
            .filter(|a| !a.trim().is_empty())
            .map(|a| MarketAddress::new(a.trim()))
            .ok_or_else(|| Error::Parse("market record without an address".into()))?;

        let creator_fee_bps = self.creator_fee_rate.unwrap_or(0);
        if creator_fee_bps > MAX_CREATOR_FEE_BPS {
            return Err(Error::Parse(format!(
                "market {address}: creator fee {creator_fee_bps} bps exceeds {MAX_CREATOR_FEE_BPS}"
            )));
        }

        let options: Vec<String> = self.options.into_iter().map(OptionLabel::into_string).collect();
        let pools: Vec<Amount> = self
            .option_volumes
            .into_iter()
            .map(|v| v.unwrap_or(Decimal::ZERO))
            .collect();
        let option_pools = fit_pools(pools, options.len());

        let status = match self.status.as_deref() {
            None => MarketStatus::Active,
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                warn!(market = %address, status = raw, "Unknown cached status, treating as active");
                MarketStatus::Active
            }),
        };

        let volume_source = self
            .volume_source
            .as_deref()
            .and_then(|s| s.parse().ok())
            .unwrap_or(VolumeSource::Pools);
        let total_volume = match volume_source {
            VolumeSource::Escrow => self.total_volume.unwrap_or(Decimal::ZERO),
            _ => option_pools.iter().copied().sum(),
        };

        Ok(Market {
            address,
            question: self.question.unwrap_or_default().trim().to_string(),
            category: self.category.unwrap_or_default(),
            options,
            option_pools,
            total_volume,
            status,
            resolved_option: self.resolved_option,
            resolution_date: self.resolution_date,
            min_bet_amount: self.min_bet.unwrap_or(Decimal::ZERO),
            creator_fee_bps,
            // Fallback values are display-only and never survive a round trip.
            volume_source: if volume_source == VolumeSource::Escrow {
                VolumeSource::Escrow
            } else {
                VolumeSource::Pools
            },
            tournament_id: self.tournament_id.map(TournamentId::from),
            creator: self.creator.map(WalletAddress::from),
            created_at: self.created_at,
        })
    }
}

/// Pad with zeros or truncate so pools line up with options.
pub fn fit_pools(mut pools: Vec<Amount>, options: usize) -> Vec<Amount> {
    if options > 0 {
        pools.resize(options, Decimal::ZERO);
    }
    pools
}

/// Merge the cached record and the authoritative ledger read.
///
/// Ledger wins for `option_pools`, and for `status` and `resolved_option`
/// while the cached market is still open. A resolved or cancelled cache entry
/// keeps its status. Cache wins for display metadata. An open market past its
/// resolution date is shown as pending resolution.
///
/// # Errors
///
/// - [`Error::NotFound`] when neither source knows the address.
/// - [`Error::Conflict`] when cache and ledger record different outcomes.
pub fn merge(
    address: &MarketAddress,
    cached: Option<&Market>,
    ledger: Option<&LedgerSnapshot>,
    now: DateTime<Utc>,
) -> Result<Market> {
    let mut market = match (cached, ledger) {
        (None, None) => return Err(Error::NotFound(address.clone())),
        (Some(cached), _) => cached.clone(),
        (None, Some(snapshot)) => {
            let mut market = Market::new(address.clone(), "", snapshot.options.clone());
            market.min_bet_amount = snapshot.min_bet_amount.unwrap_or(Decimal::ZERO);
            market.creator_fee_bps = snapshot.creator_fee_bps.unwrap_or(0);
            market.resolution_date = snapshot.resolution_date;
            market
        }
    };

    if let Some(snapshot) = ledger {
        if market.question.is_empty() {
            market.question = snapshot.question.clone().unwrap_or_default();
        }
        if market.category.is_empty() {
            market.category = snapshot.category.clone().unwrap_or_default();
        }
        if market.options.is_empty() {
            market.options = snapshot.options.clone();
        }
        if market.resolution_date.is_none() {
            market.resolution_date = snapshot.resolution_date;
        }

        match (market.resolved_option, snapshot.resolution()) {
            (Some(cached), Some(ledger)) if cached != ledger => {
                return Err(Error::Conflict {
                    address: address.clone(),
                    cached,
                    ledger,
                });
            }
            (_, Some(ledger)) if market.status != MarketStatus::Cancelled => {
                market.status = MarketStatus::Resolved;
                market.resolved_option = Some(ledger);
            }
            (_, None) if market.status.is_open() => {
                market.status = snapshot.status;
                market.resolved_option = None;
            }
            // Resolved and cancelled never move back.
            _ => {}
        }
        market.option_pools = fit_pools(snapshot.option_pools.clone(), market.options.len());
        market.total_volume = market.pool_sum();
        market.volume_source = VolumeSource::Pools;
    } else {
        market.option_pools = fit_pools(market.option_pools, market.options.len());
    }

    if market.status == MarketStatus::Active
        && market.resolution_date.is_some_and(|date| date <= now)
    {
        market.status = MarketStatus::PendingResolution;
    }

    Ok(market)
}
