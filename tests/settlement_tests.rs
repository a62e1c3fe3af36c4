mod support;

use std::sync::Arc;

use rust_decimal_macros::dec;
use rust_decimal::Decimal;
use stakeline::application::settlement::StakeRecord;
use stakeline::application::{ClaimOutcome, SyncOutcome};
use stakeline::domain::id::{MarketAddress, WalletAddress};
use stakeline::domain::market::VolumeSource;
use stakeline::error::Error;
use stakeline::port::outbound::store::{MarketStore, PositionStore};
use stakeline::testkit::domain::{key, market, position, resolved_snapshot};
use tokio::sync::Barrier;

use support::{core_with, worked_market, worked_positions};

#[tokio::test]
async fn worked_example_pays_95_5() {
    let tc = core_with(vec![worked_market()], worked_positions());

    let payout = tc.core.settlement.preview(&key("m1", "alice", 0)).await.unwrap();

    assert_eq!(payout.gross, dec!(100));
    assert_eq!(payout.platform_fee, dec!(2.5));
    assert_eq!(payout.creator_fee, dec!(2));
    assert_eq!(payout.net, dec!(95.5));
    assert!(payout.claimable);
}

#[tokio::test]
async fn distribution_conserves_settlement_volume() {
    let tc = core_with(vec![worked_market()], worked_positions());

    let summary = tc
        .core
        .settlement
        .summarize(&worked_market().address)
        .await
        .unwrap();

    assert_eq!(summary.winning_positions, 2);
    assert_eq!(summary.losing_positions, 1);
    assert_eq!(summary.distributed(), dec!(1000));
    assert_eq!(summary.total_platform_fees, dec!(25));
    assert_eq!(summary.total_creator_fees, dec!(20));
}

#[tokio::test]
async fn claim_writes_once_then_rejects() {
    let tc = core_with(vec![worked_market()], worked_positions());
    let alice = key("m1", "alice", 0);

    let ClaimOutcome::Claimed(receipt) = tc.core.settlement.claim(&alice).await.unwrap() else {
        panic!("expected a receipt");
    };
    assert_eq!(receipt.payout.net, dec!(95.5));

    let stored = tc.positions.get(&alice).await.unwrap().unwrap();
    assert!(stored.claimed);
    assert_eq!(stored.payout, Some(dec!(95.5)));
    assert_eq!(stored.claimed_at, Some(receipt.claimed_at));

    let err = tc.core.settlement.claim(&alice).await.unwrap_err();
    assert!(matches!(err, Error::AlreadyClaimed(k) if k == alice));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_claims_pay_exactly_once() {
    let tc = Arc::new(core_with(vec![worked_market()], worked_positions()));
    let barrier = Arc::new(Barrier::new(8));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let tc = Arc::clone(&tc);
            let barrier = Arc::clone(&barrier);
            tokio::spawn(async move {
                barrier.wait().await;
                tc.core.settlement.claim(&key("m1", "bob", 0)).await
            })
        })
        .collect();

    let mut receipts = 0;
    let mut already = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(ClaimOutcome::Claimed(_)) => receipts += 1,
            Err(Error::AlreadyClaimed(_)) => already += 1,
            other => panic!("unexpected claim result: {other:?}"),
        }
    }
    assert_eq!(receipts, 1);
    assert_eq!(already, 7);
}

#[tokio::test]
async fn losing_position_is_not_written() {
    let tc = core_with(vec![worked_market()], worked_positions());
    let carol = key("m1", "carol", 1);

    let outcome = tc.core.settlement.claim(&carol).await.unwrap();
    assert_eq!(outcome, ClaimOutcome::NotWinning);

    let stored = tc.positions.get(&carol).await.unwrap().unwrap();
    assert!(!stored.claimed);
    assert!(stored.payout.is_none());
}

#[tokio::test]
async fn unresolved_market_cannot_be_claimed() {
    let open = market("m2", &[dec!(10), dec!(10)]);
    let tc = core_with(vec![open], vec![position("m2", "dave", 0, dec!(10))]);

    let err = tc.core.settlement.claim(&key("m2", "dave", 0)).await.unwrap_err();
    assert!(matches!(err, Error::NotResolved(_)));
}

#[tokio::test]
async fn unknown_position_is_reported() {
    let tc = core_with(vec![worked_market()], worked_positions());

    let err = tc.core.settlement.preview(&key("m1", "eve", 0)).await.unwrap_err();
    assert!(matches!(err, Error::PositionNotFound(_)));

    let err = tc.core.settlement.preview(&key("nope", "alice", 0)).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn empty_winning_pool_pays_nothing() {
    let mut lopsided = worked_market();
    lopsided.option_pools = vec![dec!(0), dec!(1000)];
    let tc = core_with(vec![lopsided], vec![position("m1", "alice", 0, dec!(60))]);

    let payout = tc.core.settlement.preview(&key("m1", "alice", 0)).await.unwrap();
    assert!(!payout.claimable);
    assert_eq!(payout.net, dec!(0));
}

#[tokio::test]
async fn wallet_stats_track_realized_profit() {
    let mut positions = worked_positions();
    positions.push(position("m2", "alice", 1, dec!(15)));
    let tc = core_with(
        vec![worked_market(), market("m2", &[dec!(0), dec!(15)])],
        positions,
    );
    tc.core.settlement.claim(&key("m1", "alice", 0)).await.unwrap();

    let stats = tc
        .core
        .settlement
        .wallet_stats(&WalletAddress::from("alice"))
        .await
        .unwrap();

    assert_eq!(stats.positions, 2);
    assert_eq!(stats.total_staked, dec!(75));
    assert_eq!(stats.won, 1);
    assert_eq!(stats.lost, 0);
    assert_eq!(stats.open, 1);
    assert_eq!(stats.claimed_payouts, dec!(95.5));
    assert_eq!(stats.realized_profit, dec!(35.5));
}

#[tokio::test]
async fn record_stake_validates_option_and_amount() {
    let tc = core_with(vec![market("m2", &[dec!(0), dec!(0)])], Vec::new());
    let stake = |option_index, amount| StakeRecord {
        market: "m2".into(),
        owner: "frank".into(),
        option_index,
        amount,
    };

    let recorded = tc.core.settlement.record_stake(stake(1, dec!(5))).await.unwrap();
    assert_eq!(recorded.amount, dec!(5));
    assert_eq!(tc.core.settlement.positions(&recorded.key.market).await.unwrap().len(), 1);

    assert!(matches!(
        tc.core.settlement.record_stake(stake(2, dec!(5))).await,
        Err(Error::Parse(_))
    ));
    assert!(matches!(
        tc.core.settlement.record_stake(stake(0, dec!(0))).await,
        Err(Error::Parse(_))
    ));
}

#[tokio::test]
async fn synced_market_settles_on_the_ledger_pools() {
    let mut deployed = market("m1", &[dec!(0), dec!(0)]);
    deployed.creator_fee_bps = 200;
    let tc = core_with(vec![deployed], vec![position("m1", "alice", 0, dec!(60))]);
    tc.ledger.set(
        "m1",
        resolved_snapshot(&[dec!(600), dec!(400)], 0).with_escrow(dec!(1000)),
    );
    let m1 = MarketAddress::from("m1");

    assert_eq!(
        tc.core.resolution.sync_resolution(&m1).await.unwrap(),
        SyncOutcome::Resolved { option: 0 }
    );
    let stored = tc.markets.get(&m1).await.unwrap().unwrap();
    assert_eq!(stored.option_pools, vec![dec!(600), dec!(400)]);
    assert_eq!(stored.total_volume, dec!(1000));
    assert_eq!(stored.volume_source, VolumeSource::Escrow);

    let ClaimOutcome::Claimed(receipt) = tc.core.settlement.claim(&key("m1", "alice", 0)).await.unwrap()
    else {
        panic!("expected a receipt");
    };
    assert_eq!(receipt.payout.gross, dec!(100));
    assert_eq!(receipt.payout.net, dec!(95.5));
}

#[tokio::test]
async fn escrow_total_scales_claims() {
    let mut escrowed = worked_market();
    escrowed.total_volume = dec!(1200);
    escrowed.volume_source = VolumeSource::Escrow;
    let tc = core_with(vec![escrowed], worked_positions());

    let ClaimOutcome::Claimed(receipt) = tc.core.settlement.claim(&key("m1", "alice", 0)).await.unwrap()
    else {
        panic!("expected a receipt");
    };
    assert_eq!(receipt.payout.gross, dec!(120));
    assert_eq!(receipt.payout.net, dec!(114.6));

    let summary = tc.core.settlement.summarize(&MarketAddress::from("m1")).await.unwrap();
    assert_eq!(summary.distributed(), dec!(1200));
}

#[tokio::test]
async fn oversized_stake_is_an_error_not_a_crash() {
    let huge = Decimal::from_i128_with_scale(70 * 10_i128.pow(26), 0);
    let mut whale = worked_market();
    whale.option_pools = vec![dec!(0.0000001), dec!(1)];
    whale.total_volume = huge;
    whale.volume_source = VolumeSource::Escrow;
    let tc = core_with(vec![whale], vec![position("m1", "whale", 0, huge)]);

    let err = tc.core.settlement.claim(&key("m1", "whale", 0)).await.unwrap_err();
    assert!(matches!(err, Error::Settlement { .. }));
    assert!(!tc.positions.get(&key("m1", "whale", 0)).await.unwrap().unwrap().claimed);
}

#[tokio::test]
async fn claim_locks_are_released() {
    let tc = core_with(vec![worked_market()], worked_positions());

    for owner in ["alice", "bob", "carol"] {
        let option = u8::from(owner == "carol");
        tc.core.settlement.claim(&key("m1", owner, option)).await.unwrap();
    }
    tc.core.settlement.claim(&key("m1", "alice", 0)).await.unwrap_err();

    assert_eq!(tc.core.settlement.tracked_locks(), 0);
}
