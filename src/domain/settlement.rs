//! Proportional payout arithmetic for resolved markets.
//!
//! A winning position receives its share of the winning option's pool,
//! applied to the market's settlement volume, minus the platform fee and
//! the market creator's fee:
//!
//! ```text
//! gross    = amount / winning_pool * settlement_volume
//! platform = gross * PLATFORM_FEE_BPS / 10_000
//! creator  = gross * creator_fee_bps  / 10_000
//! net      = gross - platform - creator
//! ```
//!
//! Summing `net + platform + creator` over every winning position returns the
//! settlement volume (up to decimal rounding). The functions here are pure;
//! the claim write lives in the application layer.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::market::Market;
use super::money::{bps_to_rate, Amount, MAX_CREATOR_FEE_BPS, PLATFORM_FEE_BPS};
use super::position::Position;
use crate::error::{Error, Result};

/// Breakdown of what a position is worth after resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payout {
    pub gross: Amount,
    pub platform_fee: Amount,
    pub creator_fee: Amount,
    pub net: Amount,
    /// False for losing positions and for empty winning pools.
    pub claimable: bool,
}

impl Payout {
    /// A zero, non-claimable payout (the position lost).
    #[must_use]
    pub const fn nothing() -> Self {
        Self {
            gross: Decimal::ZERO,
            platform_fee: Decimal::ZERO,
            creator_fee: Decimal::ZERO,
            net: Decimal::ZERO,
            claimable: false,
        }
    }

    /// Apply platform and creator fees to a gross amount.
    #[must_use]
    pub fn from_gross(gross: Amount, creator_fee_bps: u32) -> Self {
        let platform_fee = gross * bps_to_rate(PLATFORM_FEE_BPS);
        let creator_fee = gross * bps_to_rate(creator_fee_bps);
        Self {
            gross,
            platform_fee,
            creator_fee,
            net: gross - platform_fee - creator_fee,
            claimable: gross > Decimal::ZERO,
        }
    }
}

/// Compute the payout of one position against a resolved market.
///
/// # Errors
///
/// - [`Error::NotResolved`] if the market has no recorded outcome.
/// - [`Error::AlreadyClaimed`] if the position was already paid.
/// - [`Error::PositionNotFound`] if the position belongs to another market.
/// - [`Error::Settlement`] if the creator fee exceeds [`MAX_CREATOR_FEE_BPS`]
///   or the share falls outside the decimal range.
pub fn compute_payout(market: &Market, position: &Position) -> Result<Payout> {
    if position.market() != &market.address {
        return Err(Error::PositionNotFound(position.key.clone()));
    }
    let winner = match (market.is_resolved(), market.resolved_option) {
        (true, Some(option)) => option,
        _ => return Err(Error::NotResolved(market.address.clone())),
    };
    if position.claimed {
        return Err(Error::AlreadyClaimed(position.key.clone()));
    }
    if position.option_index() != winner {
        return Ok(Payout::nothing());
    }

    // Proportional share uses the pool bucket even when the total came from escrow.
    let winning_pool = market.pool(winner);
    if winning_pool.is_zero() {
        return Ok(Payout::nothing());
    }
    if market.creator_fee_bps > MAX_CREATOR_FEE_BPS {
        return Err(Error::Settlement {
            address: market.address.clone(),
            reason: format!(
                "creator fee {} bps exceeds {MAX_CREATOR_FEE_BPS}",
                market.creator_fee_bps
            ),
        });
    }

    let volume = market.settlement_volume();
    let gross = share_of(position.amount, volume, winning_pool).ok_or_else(|| Error::Settlement {
        address: market.address.clone(),
        reason: format!("payout of {} is outside the decimal range", position.key),
    })?;

    Ok(Payout::from_gross(gross, market.creator_fee_bps))
}

/// `amount * volume / pool`, multiplying first for precision and dividing
/// first when the product would overflow.
fn share_of(amount: Amount, volume: Amount, pool: Amount) -> Option<Amount> {
    amount
        .checked_mul(volume)
        .and_then(|product| product.checked_div(pool))
        .or_else(|| {
            amount
                .checked_div(pool)
                .and_then(|share| share.checked_mul(volume))
        })
}

/// Totals across every position of a market.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementSummary {
    pub winning_positions: usize,
    pub losing_positions: usize,
    pub total_net: Amount,
    pub total_platform_fees: Amount,
    pub total_creator_fees: Amount,
}

impl SettlementSummary {
    /// Everything distributed: net payouts plus both fees.
    #[must_use]
    pub fn distributed(&self) -> Amount {
        self.total_net + self.total_platform_fees + self.total_creator_fees
    }
}

/// Preview the full distribution of a resolved market, ignoring claim state.
///
/// # Errors
///
/// Returns [`Error::NotResolved`] if the market has no recorded outcome.
pub fn summarize(market: &Market, positions: &[Position]) -> Result<SettlementSummary> {
    let mut summary = SettlementSummary::default();
    for position in positions.iter().filter(|p| p.market() == &market.address) {
        let mut unclaimed = position.clone();
        unclaimed.claimed = false;
        let payout = compute_payout(market, &unclaimed)?;
        if payout.claimable {
            summary.winning_positions += 1;
            summary.total_net += payout.net;
            summary.total_platform_fees += payout.platform_fee;
            summary.total_creator_fees += payout.creator_fee;
        } else {
            summary.losing_positions += 1;
        }
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::id::{MarketAddress, WalletAddress};
    use crate::domain::market::MarketStatus;
    use crate::domain::position::PositionKey;
    use rust_decimal_macros::dec;

    fn resolved_market(winner: u8) -> Market {
        let mut market = Market::new(
            MarketAddress::from("m1"),
            "Inter Miami - Porto",
            vec!["Inter Miami".into(), "Porto".into()],
        );
        market.option_pools = vec![dec!(600), dec!(400)];
        market.total_volume = dec!(1000);
        market.creator_fee_bps = 200;
        market.status = MarketStatus::Resolved;
        market.resolved_option = Some(winner);
        market
    }

    fn position(owner: &str, option: u8, amount: Decimal) -> Position {
        Position::new(
            PositionKey::new(MarketAddress::from("m1"), WalletAddress::from(owner), option),
            amount,
        )
    }

    #[test]
    fn worked_example_pays_ninety_five_and_a_half() {
        let payout = compute_payout(&resolved_market(0), &position("w1", 0, dec!(60))).unwrap();

        assert_eq!(payout.gross, dec!(100));
        assert_eq!(payout.platform_fee, dec!(2.5));
        assert_eq!(payout.creator_fee, dec!(2));
        assert_eq!(payout.net, dec!(95.5));
        assert!(payout.claimable);
    }

    #[test]
    fn losing_position_gets_nothing() {
        let payout = compute_payout(&resolved_market(0), &position("w1", 1, dec!(40))).unwrap();
        assert_eq!(payout, Payout::nothing());
    }

    #[test]
    fn unresolved_market_is_rejected() {
        let mut market = resolved_market(0);
        market.status = MarketStatus::Active;
        market.resolved_option = None;

        let err = compute_payout(&market, &position("w1", 0, dec!(60))).unwrap_err();
        assert!(matches!(err, Error::NotResolved(_)));
    }

    #[test]
    fn claimed_position_is_rejected() {
        let mut pos = position("w1", 0, dec!(60));
        pos.claimed = true;

        let err = compute_payout(&resolved_market(0), &pos).unwrap_err();
        assert!(matches!(err, Error::AlreadyClaimed(_)));
    }

    #[test]
    fn empty_winning_pool_pays_zero() {
        let mut market = resolved_market(1);
        market.option_pools = vec![dec!(1000), Decimal::ZERO];

        let payout = compute_payout(&market, &position("w1", 1, dec!(10))).unwrap();
        assert_eq!(payout.gross, Decimal::ZERO);
        assert!(!payout.claimable);
    }

    #[test]
    fn escrow_total_scales_payout_but_share_uses_pool() {
        let mut market = resolved_market(0);
        market.total_volume = dec!(1200);
        market.volume_source = crate::domain::market::VolumeSource::Escrow;

        let payout = compute_payout(&market, &position("w1", 0, dec!(60))).unwrap();
        assert_eq!(payout.gross, dec!(120));
    }

    /// `tenths` x 10^26, near the top of the decimal range.
    fn huge(tenths: i128) -> Decimal {
        Decimal::from_i128_with_scale(tenths * 10_i128.pow(26), 0)
    }

    #[test]
    fn large_amounts_divide_before_multiplying() {
        let mut market = resolved_market(0);
        market.option_pools = vec![huge(40), huge(40)];
        market.total_volume = huge(70);
        market.volume_source = crate::domain::market::VolumeSource::Escrow;

        let payout = compute_payout(&market, &position("w1", 0, huge(20))).unwrap();
        assert_eq!(payout.gross, huge(35));
        assert!(payout.claimable);
    }

    #[test]
    fn unrepresentable_share_is_an_error() {
        let mut market = resolved_market(0);
        market.option_pools = vec![dec!(0.0000001), dec!(1)];
        market.total_volume = huge(70);
        market.volume_source = crate::domain::market::VolumeSource::Escrow;

        let err = compute_payout(&market, &position("w1", 0, huge(70))).unwrap_err();
        assert!(matches!(err, Error::Settlement { .. }));
    }

    #[test]
    fn creator_fee_above_the_cap_is_rejected() {
        let mut market = resolved_market(0);
        market.creator_fee_bps = MAX_CREATOR_FEE_BPS;
        let payout = compute_payout(&market, &position("w1", 0, dec!(60))).unwrap();
        assert_eq!(payout.net, Decimal::ZERO);

        market.creator_fee_bps = MAX_CREATOR_FEE_BPS + 1;
        let err = compute_payout(&market, &position("w1", 0, dec!(60))).unwrap_err();
        assert!(matches!(err, Error::Settlement { .. }));
    }

    #[test]
    fn summary_conserves_volume() {
        let market = resolved_market(0);
        let positions = vec![
            position("a", 0, dec!(100)),
            position("b", 0, dec!(200)),
            position("c", 0, dec!(300)),
            position("d", 1, dec!(400)),
        ];

        let summary = summarize(&market, &positions).unwrap();
        assert_eq!(summary.winning_positions, 3);
        assert_eq!(summary.losing_positions, 1);
        assert!((summary.distributed() - dec!(1000)).abs() < dec!(0.000001));
    }
}
