//! Staked positions and claim records.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::{MarketAddress, WalletAddress};
use super::money::Amount;

/// Identity of a position: one owner's stake on one option of one market.
///
/// Claims are serialized per key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PositionKey {
    pub market: MarketAddress,
    pub owner: WalletAddress,
    pub option_index: u8,
}

impl PositionKey {
    #[must_use]
    pub fn new(market: MarketAddress, owner: WalletAddress, option_index: u8) -> Self {
        Self {
            market,
            owner,
            option_index,
        }
    }
}

impl fmt::Display for PositionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}#{}", self.market, self.owner, self.option_index)
    }
}

/// A stake on one option. `amount` never changes once created; `claimed`
/// only ever goes from false to true.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub key: PositionKey,
    pub amount: Amount,
    pub claimed: bool,
    /// Net payout recorded by the claim write.
    pub payout: Option<Amount>,
    pub claimed_at: Option<DateTime<Utc>>,
}

impl Position {
    /// Create an unclaimed position.
    #[must_use]
    pub fn new(key: PositionKey, amount: Amount) -> Self {
        Self {
            key,
            amount,
            claimed: false,
            payout: None,
            claimed_at: None,
        }
    }

    #[must_use]
    pub fn market(&self) -> &MarketAddress {
        &self.key.market
    }

    #[must_use]
    pub fn owner(&self) -> &WalletAddress {
        &self.key.owner
    }

    #[must_use]
    pub fn option_index(&self) -> u8 {
        self.key.option_index
    }
}

/// Proof of a successful claim write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimReceipt {
    pub key: PositionKey,
    pub payout: super::settlement::Payout,
    pub claimed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn new_position_is_unclaimed() {
        let key = PositionKey::new(MarketAddress::from("m1"), WalletAddress::from("w1"), 1);
        let position = Position::new(key.clone(), dec!(60));

        assert!(!position.claimed);
        assert_eq!(position.payout, None);
        assert_eq!(position.option_index(), 1);
        assert_eq!(position.market(), &key.market);
    }

    #[test]
    fn key_display_is_compact() {
        let key = PositionKey::new(MarketAddress::from("m1"), WalletAddress::from("w1"), 2);
        assert_eq!(key.to_string(), "m1/w1#2");
    }
}
