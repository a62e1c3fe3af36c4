//! Operator-gated deployment of externally-sourced markets.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::deployment::{self, CandidateMarket, DeploymentPlan, DeploymentRecord};
use crate::domain::id::{MarketAddress, WalletAddress};
use crate::domain::market::Market;
use crate::error::{Error, Result};
use crate::port::outbound::auth::Authorizer;
use crate::port::outbound::store::MarketStore;

/// Turns operator-approved candidates into new cached markets.
///
/// Only wallets the [`Authorizer`] accepts may deploy. Validation runs
/// before any write, so a rejected deployment leaves the store untouched.
pub struct DeploymentService<M, A> {
    store: Arc<M>,
    authorizer: Arc<A>,
}

impl<M, A> DeploymentService<M, A>
where
    M: MarketStore,
    A: Authorizer,
{
    #[must_use]
    pub fn new(store: Arc<M>, authorizer: Arc<A>) -> Self {
        Self { store, authorizer }
    }

    /// Validate a selection without deploying anything.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] naming the violated rule.
    pub fn select_deployment_options(
        &self,
        candidate: &CandidateMarket,
        selection: &[String],
    ) -> Result<DeploymentPlan> {
        Ok(deployment::select_options(candidate, selection)?)
    }

    /// Deploy a candidate as a brand new active market.
    ///
    /// Every deployment gets a fresh address; existing markets are never
    /// changed.
    ///
    /// # Errors
    ///
    /// - [`Error::Unauthorized`] if `caller` is not an operator.
    /// - [`Error::Validation`] if the selection breaks a rule.
    /// - [`Error::DuplicateMarket`] if the generated address is taken.
    pub async fn deploy(
        &self,
        caller: &WalletAddress,
        candidate: &CandidateMarket,
        selection: &[String],
    ) -> Result<DeploymentRecord> {
        if !self.authorizer.is_operator(caller) {
            warn!(caller = %caller, source_id = %candidate.source_id, "Deployment refused");
            return Err(Error::Unauthorized(caller.clone()));
        }

        let plan = deployment::select_options(candidate, selection)?;
        let address = MarketAddress::new(Uuid::new_v4().to_string());
        let deployed_at = Utc::now();

        let mut market = Market::new(address.clone(), candidate.question.trim(), plan.options.clone());
        market.category = candidate.category.clone();
        market.resolution_date = candidate.resolution_date;
        market.min_bet_amount = candidate.min_bet_amount;
        market.creator_fee_bps = candidate.creator_fee_bps;
        market.tournament_id = candidate.tournament_id.clone();
        market.creator = Some(caller.clone());
        market.created_at = Some(deployed_at);

        self.store.insert_new(&market).await?;
        info!(
            market = %address,
            source_id = %candidate.source_id,
            options = plan.options.len(),
            truncated = plan.truncated,
            "Market deployed"
        );

        Ok(DeploymentRecord {
            address,
            source_id: candidate.source_id.clone(),
            plan,
            deployed_at,
        })
    }
}
