//! Handler for `sync`.

use serde_json::json;
use tabled::Tabled;

use super::command::SyncArgs;
use super::output;
use crate::application::resolution::{BatchResult, LedgerResolution, SyncOutcome};
use crate::domain::id::MarketAddress;
use crate::error::Result;
use crate::infrastructure::bootstrap::SqliteCore;

/// Execute `sync`.
pub async fn execute(core: &SqliteCore, args: &SyncArgs) -> Result<()> {
    match (&args.address, args.check) {
        (Some(address), true) => check(core, &MarketAddress::from(address.as_str())).await,
        (Some(address), false) => sync_one(core, &MarketAddress::from(address.as_str())).await,
        (None, _) => sync_all(core).await,
    }
}

fn describe(outcome: SyncOutcome) -> String {
    match outcome {
        SyncOutcome::Resolved { option } => format!("resolved, option {option}"),
        SyncOutcome::AlreadyResolved { option } => format!("already resolved, option {option}"),
        SyncOutcome::StillOpen => "still open".into(),
        SyncOutcome::Cancelled => "cancelled, unchanged".into(),
        SyncOutcome::Unavailable => "ledger unavailable, unchanged".into(),
    }
}

async fn sync_one(core: &SqliteCore, address: &MarketAddress) -> Result<()> {
    let outcome = core.resolution.sync_resolution(address).await?;

    if output::is_json() {
        output::document(json!({
            "command": "sync",
            "address": address,
            "result": outcome,
        }));
        return Ok(());
    }

    match outcome {
        SyncOutcome::Resolved { .. } => output::success(&format!("{address}: {}", describe(outcome))),
        SyncOutcome::Unavailable => output::warning(&format!("{address}: {}", describe(outcome))),
        _ => output::note(&format!("{address}: {}", describe(outcome))),
    }
    Ok(())
}

async fn check(core: &SqliteCore, address: &MarketAddress) -> Result<()> {
    let status = core.resolution.resolution_status(address).await?;

    if output::is_json() {
        output::document(json!({
            "command": "sync.check",
            "status": status,
        }));
        return Ok(());
    }

    output::section("Resolution status");
    output::field("Address", &status.address);
    output::field("Cached", output::status(status.cached_status));
    output::field(
        "Cached option",
        status
            .cached_option
            .map_or_else(|| "-".to_string(), |o| o.to_string()),
    );
    match &status.ledger {
        LedgerResolution::Available { status, option } => {
            output::field("Ledger", output::status(*status));
            output::field(
                "Ledger option",
                option.map_or_else(|| "-".to_string(), |o| o.to_string()),
            );
        }
        LedgerResolution::Missing => output::field("Ledger", "no account"),
        LedgerResolution::Unavailable { reason } => {
            output::warning(&format!("Ledger unavailable: {reason}"));
        }
    }
    if status.needs_sync {
        output::note(&format!("Run: stakeline sync {address}"));
    } else {
        output::success("Cache matches ledger");
    }
    Ok(())
}

#[derive(Tabled)]
struct BatchRow {
    #[tabled(rename = "Address")]
    address: String,
    #[tabled(rename = "Result")]
    result: String,
}

async fn sync_all(core: &SqliteCore) -> Result<()> {
    let entries = core.resolution.sync_all().await?;

    if output::is_json() {
        output::document(json!({
            "command": "sync.all",
            "entries": entries,
        }));
        return Ok(());
    }

    output::section("Resolution sweep");
    if entries.is_empty() {
        output::note("(no open markets)");
        return Ok(());
    }

    let mut conflicts = 0;
    let rows: Vec<BatchRow> = entries
        .iter()
        .map(|entry| BatchRow {
            address: entry.address.to_string(),
            result: match &entry.result {
                BatchResult::Synced(outcome @ SyncOutcome::Resolved { .. }) => {
                    output::good(describe(*outcome))
                }
                BatchResult::Synced(outcome) => describe(*outcome),
                BatchResult::Conflict { cached, ledger } => {
                    conflicts += 1;
                    output::bad(format!("conflict: cached {cached}, ledger {ledger}"))
                }
                BatchResult::Failed { reason } => output::bad(reason),
            },
        })
        .collect();
    output::table(rows);

    if conflicts > 0 {
        output::warning(&format!(
            "{conflicts} market(s) disagree with the ledger and need operator review"
        ));
    }
    Ok(())
}
