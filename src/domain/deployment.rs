//! Outcome selection for externally-sourced markets.
//!
//! External markets may list more outcomes than a deployed market can hold.
//! An operator picks up to [`MAX_DEPLOYED_OPTIONS`] of them; with no pick,
//! the first four are deployed and the plan is flagged as truncated.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::id::{MarketAddress, TournamentId};
use super::money::{Amount, MAX_CREATOR_FEE_BPS};

/// Most outcomes a deployed market can carry.
pub const MAX_DEPLOYED_OPTIONS: usize = 4;

/// Fewest outcomes a deployed market can carry.
pub const MIN_DEPLOYED_OPTIONS: usize = 2;

/// Longest allowed outcome label, in characters.
pub const MAX_LABEL_CHARS: usize = 50;

/// The specific selection rule that was violated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("at most {max} options may be deployed, {selected} selected")]
    TooManyOptions { selected: usize, max: usize },

    #[error("at least {min} options must be deployed, {available} available")]
    TooFewOptions { available: usize, min: usize },

    #[error("option labels must be non-empty")]
    EmptyLabel,

    #[error("option label '{label}' exceeds {max} characters")]
    LabelTooLong { label: String, max: usize },

    #[error("option label '{label}' is selected more than once")]
    DuplicateLabel { label: String },

    #[error("option label '{label}' is not an outcome of this market")]
    UnknownOption { label: String },

    #[error("creator fee of {bps} bps exceeds the {max} bps limit")]
    CreatorFeeTooHigh { bps: u32, max: u32 },
}

/// An external market offered for deployment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateMarket {
    /// Identifier at the external source.
    pub source_id: String,
    pub question: String,
    #[serde(default)]
    pub category: String,
    /// Every outcome listed by the source, in source order.
    pub outcomes: Vec<String>,
    #[serde(default)]
    pub resolution_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub min_bet_amount: Amount,
    #[serde(default)]
    pub creator_fee_bps: u32,
    #[serde(default)]
    pub tournament_id: Option<TournamentId>,
}

/// The outcomes that will be deployed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentPlan {
    pub options: Vec<String>,
    /// True when outcomes were dropped by the first-four fallback.
    pub truncated: bool,
    pub original_option_count: usize,
}

/// Append-only record of one deployment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentRecord {
    pub address: MarketAddress,
    pub source_id: String,
    pub plan: DeploymentPlan,
    pub deployed_at: DateTime<Utc>,
}

/// Validate an operator's selection, or apply the first-four fallback.
///
/// Selected labels are deployed in selection order.
///
/// # Errors
///
/// Returns the first violated [`ValidationError`] rule. Nothing is deployed
/// on failure.
pub fn select_options(
    candidate: &CandidateMarket,
    selection: &[String],
) -> Result<DeploymentPlan, ValidationError> {
    let original_option_count = candidate.outcomes.len();

    if candidate.creator_fee_bps > MAX_CREATOR_FEE_BPS {
        return Err(ValidationError::CreatorFeeTooHigh {
            bps: candidate.creator_fee_bps,
            max: MAX_CREATOR_FEE_BPS,
        });
    }

    if selection.is_empty() {
        if original_option_count < MIN_DEPLOYED_OPTIONS {
            return Err(ValidationError::TooFewOptions {
                available: original_option_count,
                min: MIN_DEPLOYED_OPTIONS,
            });
        }
        let options: Vec<String> = candidate
            .outcomes
            .iter()
            .take(MAX_DEPLOYED_OPTIONS)
            .cloned()
            .collect();
        validate_labels(&options)?;
        return Ok(DeploymentPlan {
            truncated: original_option_count > MAX_DEPLOYED_OPTIONS,
            options,
            original_option_count,
        });
    }

    if selection.len() > MAX_DEPLOYED_OPTIONS {
        return Err(ValidationError::TooManyOptions {
            selected: selection.len(),
            max: MAX_DEPLOYED_OPTIONS,
        });
    }
    validate_labels(selection)?;
    if let Some(unknown) = selection.iter().find(|label| !candidate.outcomes.contains(label)) {
        return Err(ValidationError::UnknownOption {
            label: unknown.clone(),
        });
    }
    if selection.len() < MIN_DEPLOYED_OPTIONS {
        return Err(ValidationError::TooFewOptions {
            available: selection.len(),
            min: MIN_DEPLOYED_OPTIONS,
        });
    }

    Ok(DeploymentPlan {
        options: selection.to_vec(),
        truncated: false,
        original_option_count,
    })
}

fn validate_labels(labels: &[String]) -> Result<(), ValidationError> {
    let mut seen = HashSet::with_capacity(labels.len());
    for label in labels {
        if label.trim().is_empty() {
            return Err(ValidationError::EmptyLabel);
        }
        if label.chars().count() > MAX_LABEL_CHARS {
            return Err(ValidationError::LabelTooLong {
                label: label.clone(),
                max: MAX_LABEL_CHARS,
            });
        }
        if !seen.insert(label.as_str()) {
            return Err(ValidationError::DuplicateLabel {
                label: label.clone(),
            });
        }
    }
    Ok(())
}

impl CandidateMarket {
    /// Minimal candidate with only a question and outcomes.
    pub fn new(source_id: impl Into<String>, question: impl Into<String>, outcomes: Vec<String>) -> Self {
        Self {
            source_id: source_id.into(),
            question: question.into(),
            category: String::new(),
            outcomes,
            resolution_date: None,
            min_bet_amount: Decimal::ZERO,
            creator_fee_bps: 0,
            tournament_id: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    fn five_way() -> CandidateMarket {
        CandidateMarket::new(
            "poly-1",
            "Who wins the group?",
            labels(&["Yes", "No", "Porto", "Palmeiras", "Al Ahly"]),
        )
    }

    #[test]
    fn duplicate_selection_is_rejected() {
        let err = select_options(&five_way(), &labels(&["Yes", "Yes"])).unwrap_err();
        assert_eq!(
            err,
            ValidationError::DuplicateLabel {
                label: "Yes".into()
            }
        );
    }

    #[test]
    fn empty_selection_deploys_first_four_truncated() {
        let plan = select_options(&five_way(), &[]).unwrap();
        assert_eq!(plan.options, labels(&["Yes", "No", "Porto", "Palmeiras"]));
        assert!(plan.truncated);
        assert_eq!(plan.original_option_count, 5);
    }

    #[test]
    fn small_market_is_not_truncated() {
        let candidate = CandidateMarket::new("p", "Q", labels(&["Yes", "No"]));
        let plan = select_options(&candidate, &[]).unwrap();
        assert_eq!(plan.options, labels(&["Yes", "No"]));
        assert!(!plan.truncated);
    }

    #[test]
    fn selection_keeps_operator_order() {
        let plan = select_options(&five_way(), &labels(&["Al Ahly", "Porto"])).unwrap();
        assert_eq!(plan.options, labels(&["Al Ahly", "Porto"]));
        assert!(!plan.truncated);
    }

    #[test]
    fn creator_fee_must_leave_a_payout() {
        let mut candidate = five_way();
        candidate.creator_fee_bps = 9_750;
        assert!(select_options(&candidate, &[]).is_ok());

        candidate.creator_fee_bps = 9_751;
        let err = select_options(&candidate, &[]).unwrap_err();
        assert_eq!(err, ValidationError::CreatorFeeTooHigh { bps: 9_751, max: 9_750 });
    }

    #[test]
    fn too_many_selected() {
        let err = select_options(
            &five_way(),
            &labels(&["Yes", "No", "Porto", "Palmeiras", "Al Ahly"]),
        )
        .unwrap_err();
        assert_eq!(err, ValidationError::TooManyOptions { selected: 5, max: 4 });
    }

    #[test]
    fn blank_label_is_rejected() {
        let err = select_options(&five_way(), &labels(&["Yes", "   "])).unwrap_err();
        assert_eq!(err, ValidationError::EmptyLabel);
    }

    #[test]
    fn long_label_is_rejected() {
        let long = "x".repeat(51);
        let mut candidate = five_way();
        candidate.outcomes.push(long.clone());
        let err = select_options(&candidate, &[long.clone(), "Yes".into()]).unwrap_err();
        assert!(matches!(err, ValidationError::LabelTooLong { max: 50, .. }));
    }

    #[test]
    fn fifty_char_label_is_allowed() {
        let exact = "y".repeat(50);
        let mut candidate = five_way();
        candidate.outcomes.push(exact.clone());
        assert!(select_options(&candidate, &[exact, "No".into()]).is_ok());
    }

    #[test]
    fn labels_are_case_sensitive() {
        let candidate = CandidateMarket::new("p", "Q", labels(&["yes", "Yes"]));
        let plan = select_options(&candidate, &labels(&["yes", "Yes"])).unwrap();
        assert_eq!(plan.options.len(), 2);
    }

    #[test]
    fn unknown_label_is_rejected() {
        let err = select_options(&five_way(), &labels(&["Yes", "Benfica"])).unwrap_err();
        assert_eq!(
            err,
            ValidationError::UnknownOption {
                label: "Benfica".into()
            }
        );
    }

    #[test]
    fn single_option_is_too_few() {
        let err = select_options(&five_way(), &labels(&["Porto"])).unwrap_err();
        assert_eq!(err, ValidationError::TooFewOptions { available: 1, min: 2 });
    }
}
