#![allow(dead_code)]

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use stakeline::adapter::outbound::memory::{MemoryMarketStore, MemoryPositionStore};
use stakeline::adapter::outbound::schedule::StaticSchedule;
use stakeline::domain::id::TournamentId;
use stakeline::domain::market::Market;
use stakeline::domain::position::Position;
use stakeline::domain::standings::ScheduledMatch;
use stakeline::testkit::domain;
use stakeline::testkit::ledger::ScriptedLedger;
use stakeline::testkit::services::{settings, TestCore};

pub const TOURNAMENT: &str = "cwc-2025";

/// Core over the given markets and positions, empty ledger.
pub fn core_with(markets: Vec<Market>, positions: Vec<Position>) -> TestCore {
    TestCore::build(
        MemoryMarketStore::with_markets(markets),
        MemoryPositionStore::with_positions(positions),
        ScriptedLedger::new(),
        StaticSchedule::new(),
        settings(),
    )
}

/// The worked settlement example: pools 600/400, volume 1000, option 0
/// wins, 2% creator fee.
pub fn worked_market() -> Market {
    domain::resolved_market("m1", &[dec!(600), dec!(400)], dec!(1000), 0, 200)
}

/// Stakes that make up the worked market's pools.
pub fn worked_positions() -> Vec<Position> {
    vec![
        domain::position("m1", "alice", 0, dec!(60)),
        domain::position("m1", "bob", 0, dec!(540)),
        domain::position("m1", "carol", 1, dec!(400)),
    ]
}

/// Group A of the example tournament.
pub fn group_a() -> Vec<ScheduledMatch> {
    vec![
        ScheduledMatch::group_stage("Group A", "Al Ahly", "Inter Miami"),
        ScheduledMatch::group_stage("Group A", "Palmeiras", "Porto"),
        ScheduledMatch::group_stage("Group A", "Palmeiras", "Al Ahly"),
        ScheduledMatch::group_stage("Group A", "Inter Miami", "Porto"),
    ]
}

pub fn schedule() -> StaticSchedule {
    StaticSchedule::new().with_tournament(TournamentId::from(TOURNAMENT), group_a())
}

/// Core with the Group A schedule and the given match markets.
pub fn tournament_core(markets: Vec<Market>) -> TestCore {
    TestCore::build(
        MemoryMarketStore::with_markets(markets),
        MemoryPositionStore::new(),
        ScriptedLedger::new(),
        schedule(),
        settings(),
    )
}

pub fn zero() -> Decimal {
    Decimal::ZERO
}
