//! Builders for domain values used across tests.
//!
//! Keep tests focused on assertions rather than struct literals.

use rust_decimal::Decimal;

use crate::domain::id::{MarketAddress, TournamentId, WalletAddress};
use crate::domain::ledger::LedgerSnapshot;
use crate::domain::market::{Market, MarketStatus, VolumeSource};
use crate::domain::position::{Position, PositionKey};
use crate::domain::standings::match_question;

/// Active market with the given pools; total volume is the pool sum.
pub fn market(address: &str, pools: &[Decimal]) -> Market {
    let options = (0..pools.len()).map(|i| format!("Option {i}")).collect();
    let mut market = Market::new(MarketAddress::from(address), format!("Question {address}"), options);
    market.option_pools = pools.to_vec();
    market.total_volume = market.pool_sum();
    market.volume_source = VolumeSource::Pools;
    market
}

/// Resolved market with the given pools, total volume and fees.
pub fn resolved_market(
    address: &str,
    pools: &[Decimal],
    total_volume: Decimal,
    winner: u8,
    creator_fee_bps: u32,
) -> Market {
    let mut market = market(address, pools);
    market.total_volume = total_volume;
    market.status = MarketStatus::Resolved;
    market.resolved_option = Some(winner);
    market.creator_fee_bps = creator_fee_bps;
    market
}

/// Match market for a fixture: home, away and draw outcomes.
pub fn match_market(address: &str, tournament: &str, home: &str, away: &str) -> Market {
    let mut market = Market::new(
        MarketAddress::from(address),
        match_question(home, away),
        vec![home.to_string(), away.to_string(), "Draw".to_string()],
    );
    market.tournament_id = Some(TournamentId::from(tournament));
    market
}

pub fn key(market: &str, owner: &str, option: u8) -> PositionKey {
    PositionKey::new(MarketAddress::from(market), WalletAddress::from(owner), option)
}

/// Unclaimed position.
pub fn position(market: &str, owner: &str, option: u8, amount: Decimal) -> Position {
    Position::new(key(market, owner, option), amount)
}

/// Ledger snapshot for an open market.
pub fn open_snapshot(pools: &[Decimal]) -> LedgerSnapshot {
    LedgerSnapshot::new(MarketStatus::Active, None, pools.to_vec())
}

/// Ledger snapshot for a resolved market.
pub fn resolved_snapshot(pools: &[Decimal], winner: u8) -> LedgerSnapshot {
    LedgerSnapshot::new(MarketStatus::Resolved, Some(winner), pools.to_vec())
}
