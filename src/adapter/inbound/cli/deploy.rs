//! Handlers for `deploy check` and `deploy apply`.

use std::fs;
use std::path::Path;

use serde_json::json;

use super::command::DeployArgs;
use super::output;
use crate::domain::deployment::{self, CandidateMarket, DeploymentPlan};
use crate::domain::id::WalletAddress;
use crate::error::Result;
use crate::infrastructure::bootstrap::SqliteCore;

fn read_candidate(path: &Path) -> Result<CandidateMarket> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn print_plan(plan: &DeploymentPlan) {
    for (i, label) in plan.options.iter().enumerate() {
        output::note(&format!("{i}. {label}"));
    }
    if plan.truncated {
        output::warning(&format!(
            "Only the first {} of {} outcomes will be deployed",
            plan.options.len(),
            plan.original_option_count
        ));
    }
}

/// Execute `deploy check`. Needs no database.
pub fn check(args: &DeployArgs) -> Result<()> {
    let candidate = read_candidate(&args.candidate)?;
    let plan = deployment::select_options(&candidate, &args.select)?;

    if output::is_json() {
        output::document(json!({
            "command": "deploy.check",
            "source_id": candidate.source_id,
            "plan": plan,
        }));
        return Ok(());
    }

    output::section("Deployment plan");
    output::field("Source", &candidate.source_id);
    output::field("Question", candidate.question.trim());
    print_plan(&plan);
    output::success("Selection is valid");
    Ok(())
}

/// Execute `deploy apply`.
pub async fn apply(core: &SqliteCore, args: &DeployArgs, caller: &str) -> Result<()> {
    let candidate = read_candidate(&args.candidate)?;
    let record = core
        .deployment
        .deploy(&WalletAddress::from(caller), &candidate, &args.select)
        .await?;

    if output::is_json() {
        output::document(json!({
            "command": "deploy.apply",
            "record": record,
        }));
        return Ok(());
    }

    output::success(&format!("Deployed {}", record.address));
    output::field("Source", &record.source_id);
    output::field("Deployed at", record.deployed_at.to_rfc3339());
    print_plan(&record.plan);
    Ok(())
}
