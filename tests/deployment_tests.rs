use rust_decimal_macros::dec;
use stakeline::domain::deployment::{CandidateMarket, ValidationError};
use stakeline::domain::id::{TournamentId, WalletAddress};
use stakeline::domain::market::{MarketStatus, VolumeSource};
use stakeline::error::Error;
use stakeline::port::outbound::store::MarketStore;
use stakeline::testkit::services::{TestCore, OPERATOR};

fn labels(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

fn candidate() -> CandidateMarket {
    let mut candidate = CandidateMarket::new(
        "poly-123",
        "  Who tops Group A?  ",
        labels(&["Palmeiras", "Porto", "Al Ahly", "Inter Miami", "None"]),
    );
    candidate.category = "Sports".into();
    candidate.min_bet_amount = dec!(5);
    candidate.creator_fee_bps = 150;
    candidate.tournament_id = Some(TournamentId::from("cwc-2025"));
    candidate
}

fn operator() -> WalletAddress {
    WalletAddress::from(OPERATOR)
}

#[tokio::test]
async fn operator_deploys_a_fresh_active_market() {
    let tc = TestCore::new();
    let selection = labels(&["Porto", "Palmeiras"]);

    let record = tc
        .core
        .deployment
        .deploy(&operator(), &candidate(), &selection)
        .await
        .unwrap();
    assert_eq!(record.source_id, "poly-123");
    assert!(!record.plan.truncated);
    assert_eq!(record.plan.original_option_count, 5);

    let market = tc.markets.get(&record.address).await.unwrap().unwrap();
    assert_eq!(market.status, MarketStatus::Active);
    assert_eq!(market.question, "Who tops Group A?");
    assert_eq!(market.options, selection);
    assert_eq!(market.option_pools, vec![dec!(0), dec!(0)]);
    assert_eq!(market.total_volume, dec!(0));
    assert_eq!(market.volume_source, VolumeSource::Pools);
    assert_eq!(market.creator, Some(operator()));
    assert_eq!(market.creator_fee_bps, 150);
    assert_eq!(market.created_at, Some(record.deployed_at));
}

#[tokio::test]
async fn redeploying_the_same_candidate_gets_a_new_address() {
    let tc = TestCore::new();

    let first = tc.core.deployment.deploy(&operator(), &candidate(), &[]).await.unwrap();
    let second = tc.core.deployment.deploy(&operator(), &candidate(), &[]).await.unwrap();

    assert_ne!(first.address, second.address);
    assert_eq!(tc.markets.len(), 2);
}

#[tokio::test]
async fn no_selection_deploys_the_first_four() {
    let tc = TestCore::new();

    let record = tc.core.deployment.deploy(&operator(), &candidate(), &[]).await.unwrap();
    assert!(record.plan.truncated);
    assert_eq!(
        record.plan.options,
        labels(&["Palmeiras", "Porto", "Al Ahly", "Inter Miami"])
    );

    let market = tc.markets.get(&record.address).await.unwrap().unwrap();
    assert_eq!(market.options.len(), 4);
    assert_eq!(market.option_pools.len(), 4);
}

#[tokio::test]
async fn non_operator_is_refused() {
    let tc = TestCore::new();
    let stranger = WalletAddress::from("stranger");

    let err = tc
        .core
        .deployment
        .deploy(&stranger, &candidate(), &[])
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Unauthorized(w) if w == stranger));
    assert!(tc.markets.is_empty());
}

#[tokio::test]
async fn invalid_selection_deploys_nothing() {
    let tc = TestCore::new();

    let err = tc
        .core
        .deployment
        .deploy(&operator(), &candidate(), &labels(&["Porto", "Porto"]))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Validation(ValidationError::DuplicateLabel { ref label }) if label == "Porto"
    ));

    let err = tc
        .core
        .deployment
        .deploy(&operator(), &candidate(), &labels(&["Porto", "Benfica"]))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Validation(ValidationError::UnknownOption { .. })
    ));

    let err = tc
        .core
        .deployment
        .deploy(&operator(), &candidate(), &labels(&["Porto"]))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Validation(ValidationError::TooFewOptions { .. })
    ));

    assert!(tc.markets.is_empty());
}

#[test]
fn selection_check_needs_no_store() {
    let tc = TestCore::new();

    let plan = tc
        .core
        .deployment
        .select_deployment_options(&candidate(), &labels(&["None", "Porto", "Al Ahly"]))
        .unwrap();
    assert_eq!(plan.options, labels(&["None", "Porto", "Al Ahly"]));

    let err = tc
        .core
        .deployment
        .select_deployment_options(
            &candidate(),
            &labels(&["Palmeiras", "Porto", "Al Ahly", "Inter Miami", "None"]),
        )
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Validation(ValidationError::TooManyOptions { selected: 5, max: 4 })
    ));
}
