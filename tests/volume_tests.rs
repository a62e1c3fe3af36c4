mod support;

use rust_decimal_macros::dec;
use stakeline::application::market::ResyncResult;
use stakeline::domain::id::MarketAddress;
use stakeline::domain::market::{MarketStatus, VolumeSource};
use stakeline::port::outbound::store::MarketStore;
use stakeline::testkit::domain::{market, open_snapshot};

use support::core_with;

fn addr(a: &str) -> MarketAddress {
    MarketAddress::from(a)
}

#[tokio::test]
async fn resync_persists_reconciled_volumes_per_market() {
    let mut empty = market("m3", &[dec!(0), dec!(0)]);
    empty.min_bet_amount = dec!(10);
    let tc = core_with(
        vec![
            market("m1", &[dec!(1), dec!(1)]),
            market("m2", &[dec!(1), dec!(1)]),
            empty,
            market("m4", &[dec!(1), dec!(1)]),
        ],
        Vec::new(),
    );
    tc.ledger
        .set("m1", open_snapshot(&[dec!(600), dec!(400)]).with_escrow(dec!(1050)));
    tc.ledger.set("m2", open_snapshot(&[dec!(20), dec!(30), dec!(99)]));
    tc.ledger.set("m3", open_snapshot(&[dec!(0), dec!(0)]));
    // m4 has no ledger account

    let report = tc.core.markets.resync_volumes().await.unwrap();
    assert_eq!(report.entries.len(), 4);
    assert_eq!(report.updated(), 3);
    assert_eq!(report.failed(), 1);

    let result = |a: &str| {
        report
            .entries
            .iter()
            .find(|e| e.address == addr(a))
            .map(|e| e.result.clone())
            .unwrap()
    };
    assert_eq!(
        result("m1"),
        ResyncResult::Updated {
            total: dec!(1050),
            source: VolumeSource::Escrow
        }
    );
    assert!(matches!(result("m4"), ResyncResult::Failed { .. }));

    let m1 = tc.markets.get(&addr("m1")).await.unwrap().unwrap();
    assert_eq!(m1.total_volume, dec!(1050));
    assert_eq!(m1.option_pools, vec![dec!(600), dec!(400)]);

    let m2 = tc.markets.get(&addr("m2")).await.unwrap().unwrap();
    assert_eq!(m2.option_pools, vec![dec!(20), dec!(30)]);
    assert_eq!(m2.total_volume, dec!(50));
}

#[tokio::test]
async fn fallback_volume_is_never_persisted() {
    let mut empty = market("m1", &[dec!(0), dec!(0)]);
    empty.min_bet_amount = dec!(10);
    let tc = core_with(vec![empty], Vec::new());
    tc.ledger.set("m1", open_snapshot(&[dec!(0), dec!(0)]));

    let report = tc.core.markets.resync_volumes().await.unwrap();
    assert_eq!(
        report.entries[0].result,
        ResyncResult::Updated {
            total: dec!(0),
            source: VolumeSource::Pools
        }
    );

    let stored = tc.markets.get(&addr("m1")).await.unwrap().unwrap();
    assert_eq!(stored.total_volume, dec!(0));
    assert_eq!(stored.volume_source, VolumeSource::Pools);
}

#[tokio::test]
async fn resync_keeps_recorded_resolution() {
    let mut resolved = market("m1", &[dec!(1), dec!(1)]);
    resolved.status = MarketStatus::Resolved;
    resolved.resolved_option = Some(1);
    let tc = core_with(vec![resolved], Vec::new());
    tc.ledger.set("m1", open_snapshot(&[dec!(5), dec!(5)]));

    tc.core.markets.resync_volumes().await.unwrap();

    let stored = tc.markets.get(&addr("m1")).await.unwrap().unwrap();
    assert_eq!(stored.resolved_option, Some(1));
    assert_eq!(stored.status, MarketStatus::Resolved);
    assert_eq!(stored.total_volume, dec!(10));
}

#[tokio::test]
async fn analysis_counts_active_markets_only() {
    let zero = market("m1", &[dec!(0), dec!(0)]);
    let low = market("m2", &[dec!(20), dec!(30)]);
    let normal = market("m3", &[dec!(200), dec!(300)]);
    let mut resolved = market("m4", &[dec!(0), dec!(0)]);
    resolved.status = MarketStatus::Resolved;
    let tc = core_with(vec![zero, low, normal, resolved], Vec::new());

    let analysis = tc.core.markets.analyze_volumes().await.unwrap();
    assert_eq!(analysis.total, 3);
    assert_eq!(analysis.zero_volume, 1);
    assert_eq!(analysis.low_volume, 1);
    assert_eq!(analysis.normal_volume, 1);
    assert_eq!(analysis.needs_sync, vec![addr("m1")]);
    assert_eq!(tc.ledger.reads(), 0);
}
