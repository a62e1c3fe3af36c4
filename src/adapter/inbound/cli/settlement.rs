//! Handlers for `payout`, `claim`, `settlement`, `stakes` and `wallet`.

use std::fs;
use std::path::Path;

use serde_json::json;
use tabled::Tabled;

use super::command::PositionArgs;
use super::output;
use crate::application::settlement::{ClaimOutcome, StakeRecord};
use crate::domain::id::{MarketAddress, WalletAddress};
use crate::domain::position::PositionKey;
use crate::error::Result;
use crate::infrastructure::bootstrap::SqliteCore;

fn key(args: &PositionArgs) -> PositionKey {
    PositionKey::new(
        MarketAddress::from(args.market.as_str()),
        WalletAddress::from(args.owner.as_str()),
        args.option,
    )
}

/// Execute `payout`.
pub async fn payout(core: &SqliteCore, args: &PositionArgs) -> Result<()> {
    let key = key(args);
    let payout = core.settlement.preview(&key).await?;

    if output::is_json() {
        output::document(json!({
            "command": "payout",
            "position": key,
            "payout": payout,
        }));
        return Ok(());
    }

    output::section("Payout preview");
    output::field("Position", &key);
    if payout.claimable {
        output::payout(&payout);
    } else {
        output::note("Not claimable: the position did not back the winning option");
    }
    Ok(())
}

/// Execute `claim`.
pub async fn claim(core: &SqliteCore, args: &PositionArgs) -> Result<()> {
    let key = key(args);
    let outcome = core.settlement.claim(&key).await?;

    if output::is_json() {
        output::document(json!({
            "command": "claim",
            "position": key,
            "result": outcome,
        }));
        return Ok(());
    }

    match outcome {
        ClaimOutcome::Claimed(receipt) => {
            output::success(&format!("Claimed {}", receipt.key));
            output::payout(&receipt.payout);
            output::field("Claimed at", receipt.claimed_at.to_rfc3339());
        }
        ClaimOutcome::NotWinning => {
            output::note(&format!("{key} backed a losing option; nothing to claim"));
        }
    }
    Ok(())
}

/// Execute `settlement`.
pub async fn summary(core: &SqliteCore, address: &str) -> Result<()> {
    let address = MarketAddress::from(address);
    let summary = core.settlement.summarize(&address).await?;

    if output::is_json() {
        output::document(json!({
            "command": "settlement",
            "address": address,
            "summary": summary,
            "distributed": summary.distributed(),
        }));
        return Ok(());
    }

    output::section("Settlement");
    output::field("Market", &address);
    output::field("Winning", summary.winning_positions);
    output::field("Losing", summary.losing_positions);
    output::field("Net payouts", output::amount(summary.total_net));
    output::field("Platform fees", output::amount(summary.total_platform_fees));
    output::field("Creator fees", output::amount(summary.total_creator_fees));
    output::field("Distributed", output::amount(summary.distributed()));
    Ok(())
}

/// Execute `stakes import`.
pub async fn import_stakes(core: &SqliteCore, path: &Path) -> Result<()> {
    let content = fs::read_to_string(path)?;
    let records: Vec<StakeRecord> = serde_json::from_str(&content)?;

    let mut recorded = 0;
    let mut rejected = Vec::new();
    for (i, record) in records.into_iter().enumerate() {
        match core.settlement.record_stake(record).await {
            Ok(_) => recorded += 1,
            Err(err) => rejected.push(format!("record {i}: {err}")),
        }
    }

    if output::is_json() {
        output::document(json!({
            "command": "stakes.import",
            "recorded": recorded,
            "rejected": rejected,
        }));
        return Ok(());
    }

    output::success(&format!("Recorded {recorded} stake(s)"));
    for reason in &rejected {
        output::warning(reason);
    }
    Ok(())
}

#[derive(Tabled)]
struct PositionRow {
    #[tabled(rename = "Owner")]
    owner: String,
    #[tabled(rename = "Option")]
    option: u8,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Claimed")]
    claimed: String,
}

/// Execute `stakes list`.
pub async fn list_stakes(core: &SqliteCore, address: &str) -> Result<()> {
    let address = MarketAddress::from(address);
    let positions = core.settlement.positions(&address).await?;

    if output::is_json() {
        output::document(json!({
            "command": "stakes.list",
            "address": address,
            "positions": positions,
        }));
        return Ok(());
    }

    output::section("Positions");
    if positions.is_empty() {
        output::note("(none)");
        return Ok(());
    }
    let rows: Vec<PositionRow> = positions
        .iter()
        .map(|p| PositionRow {
            owner: p.owner().to_string(),
            option: p.option_index(),
            amount: output::amount(p.amount),
            claimed: match p.payout.filter(|_| p.claimed) {
                Some(payout) => output::amount(payout),
                None => "-".into(),
            },
        })
        .collect();
    output::table(rows);
    Ok(())
}

/// Execute `wallet stats`.
pub async fn wallet_stats(core: &SqliteCore, owner: &str) -> Result<()> {
    let stats = core
        .settlement
        .wallet_stats(&WalletAddress::from(owner))
        .await?;

    if output::is_json() {
        output::document(json!({
            "command": "wallet.stats",
            "stats": stats,
        }));
        return Ok(());
    }

    output::section("Wallet");
    output::field("Owner", &stats.owner);
    output::field("Positions", stats.positions);
    output::field("Staked", output::amount(stats.total_staked));
    output::field(
        "Record",
        format!("{} won, {} lost, {} open", stats.won, stats.lost, stats.open),
    );
    output::field("Claimed", output::amount(stats.claimed_payouts));
    output::field("Realized", output::signed(stats.realized_profit));
    Ok(())
}
