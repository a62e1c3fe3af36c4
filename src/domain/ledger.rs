//! Authoritative ledger reads.
//!
//! [`LedgerAccount`] is the raw on-chain shape (integer base units, numeric
//! status code). [`LedgerSnapshot`] is the validated, UI-unit view the rest
//! of the crate consumes.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::id::MarketAddress;
use super::market::MarketStatus;
use super::money::{from_base_units, Amount, MAX_CREATOR_FEE_BPS};
use crate::error::{Error, Result};

/// Raw market account as exported from the ledger.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LedgerAccount {
    /// 0 = active, 1 = resolved, 2 = cancelled.
    pub status: u8,
    #[serde(alias = "winning_option", alias = "resolvedOption")]
    pub winning_option: Option<u8>,
    #[serde(alias = "option_pools")]
    pub option_pools: Vec<u64>,
    #[serde(alias = "escrow_balance")]
    pub escrow_balance: Option<u64>,
    pub question: Option<String>,
    pub options: Vec<String>,
    pub category: Option<String>,
    #[serde(alias = "creator_fee_rate")]
    pub creator_fee_rate: Option<u32>,
    #[serde(alias = "min_bet_amount")]
    pub min_bet_amount: Option<u64>,
    /// Unix seconds.
    #[serde(alias = "resolution_date")]
    pub resolution_date: Option<i64>,
}

impl LedgerAccount {
    /// Validate and convert into UI units.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidLedger`] for unknown status codes, a resolved
    /// status without a winner, a winner outside the option range, or a
    /// creator fee that would leave a negative payout.
    pub fn into_snapshot(self, address: &MarketAddress, decimals: u32) -> Result<LedgerSnapshot> {
        let invalid = |reason: String| Error::InvalidLedger {
            address: address.clone(),
            reason,
        };

        let status = MarketStatus::from_ledger_code(self.status)
            .ok_or_else(|| invalid(format!("unknown status code {}", self.status)))?;

        if let Some(bps) = self.creator_fee_rate.filter(|bps| *bps > MAX_CREATOR_FEE_BPS) {
            return Err(invalid(format!(
                "creator fee {bps} bps exceeds {MAX_CREATOR_FEE_BPS}"
            )));
        }

        let resolved_option = match (status, self.winning_option) {
            (MarketStatus::Resolved, None) => {
                return Err(invalid("resolved without a winning option".into()));
            }
            (MarketStatus::Resolved, Some(option)) => {
                let slots = self.option_pools.len().max(self.options.len());
                if slots > 0 && usize::from(option) >= slots {
                    return Err(invalid(format!(
                        "winning option {option} out of range for {slots} options"
                    )));
                }
                Some(option)
            }
            _ => None,
        };

        Ok(LedgerSnapshot {
            status,
            resolved_option,
            option_pools: self
                .option_pools
                .iter()
                .map(|raw| from_base_units(*raw, decimals))
                .collect(),
            escrow_balance: self.escrow_balance.map(|raw| from_base_units(raw, decimals)),
            question: self.question.filter(|q| !q.trim().is_empty()),
            options: self.options,
            category: self.category.filter(|c| !c.trim().is_empty()),
            creator_fee_bps: self.creator_fee_rate,
            min_bet_amount: self.min_bet_amount.map(|raw| from_base_units(raw, decimals)),
            resolution_date: self
                .resolution_date
                .and_then(|secs| Utc.timestamp_opt(secs, 0).single()),
        })
    }
}

/// Validated authoritative state of one market.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub status: MarketStatus,
    /// Always `Some` when `status` is resolved.
    pub resolved_option: Option<u8>,
    pub option_pools: Vec<Amount>,
    pub escrow_balance: Option<Amount>,
    pub question: Option<String>,
    pub options: Vec<String>,
    pub category: Option<String>,
    pub creator_fee_bps: Option<u32>,
    pub min_bet_amount: Option<Amount>,
    pub resolution_date: Option<DateTime<Utc>>,
}

impl LedgerSnapshot {
    /// Minimal snapshot carrying only the fields the ledger is authoritative for.
    #[must_use]
    pub fn new(status: MarketStatus, resolved_option: Option<u8>, option_pools: Vec<Amount>) -> Self {
        Self {
            status,
            resolved_option,
            option_pools,
            escrow_balance: None,
            question: None,
            options: Vec::new(),
            category: None,
            creator_fee_bps: None,
            min_bet_amount: None,
            resolution_date: None,
        }
    }

    /// Set the escrow balance read alongside this snapshot.
    #[must_use]
    pub fn with_escrow(mut self, balance: Amount) -> Self {
        self.escrow_balance = Some(balance);
        self
    }

    /// The winning option when the ledger has recorded an outcome.
    #[must_use]
    pub fn resolution(&self) -> Option<u8> {
        match self.status {
            MarketStatus::Resolved => self.resolved_option,
            _ => None,
        }
    }
}
