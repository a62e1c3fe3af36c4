//! Monetary types and fee constants.

use rust_decimal::Decimal;

/// Token amount in UI units, represented as a Decimal for precision.
pub type Amount = Decimal;

/// Platform fee taken from every gross payout, in basis points (2.5%).
pub const PLATFORM_FEE_BPS: u32 = 250;

/// Basis points per whole.
pub const BPS_DENOMINATOR: u32 = 10_000;

/// Highest creator fee that still leaves a non-negative net payout.
pub const MAX_CREATOR_FEE_BPS: u32 = BPS_DENOMINATOR - PLATFORM_FEE_BPS;

/// Convert a basis-point rate into a decimal fraction (250 -> 0.025).
#[must_use]
pub fn bps_to_rate(bps: u32) -> Decimal {
    Decimal::from(bps) / Decimal::from(BPS_DENOMINATOR)
}

/// Convert an integer base-unit ledger amount into UI units.
#[must_use]
pub fn from_base_units(raw: u64, decimals: u32) -> Amount {
    // Decimal scale is limited to 28 digits; config validation caps decimals well below.
    Decimal::from_i128_with_scale(i128::from(raw), decimals)
}
