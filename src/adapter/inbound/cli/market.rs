//! Handlers for `markets` and `volumes`.

use std::fs;
use std::path::Path;

use serde_json::json;
use tabled::Tabled;

use super::command::ListArgs;
use super::output;
use crate::application::market::ResyncResult;
use crate::domain::id::{MarketAddress, TournamentId};
use crate::domain::market::{Market, MarketFilter};
use crate::domain::normalize::MarketRecord;
use crate::error::Result;
use crate::infrastructure::bootstrap::SqliteCore;

#[derive(Tabled)]
struct MarketRow {
    #[tabled(rename = "Address")]
    address: String,
    #[tabled(rename = "Question")]
    question: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Volume")]
    volume: String,
    #[tabled(rename = "Source")]
    source: String,
}

impl From<&Market> for MarketRow {
    fn from(market: &Market) -> Self {
        Self {
            address: market.address.to_string(),
            question: market.question.clone(),
            status: output::status(market.status),
            volume: output::amount(market.total_volume),
            source: market.volume_source.to_string(),
        }
    }
}

#[derive(Tabled)]
struct OptionRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Option")]
    label: String,
    #[tabled(rename = "Pool")]
    pool: String,
    #[tabled(rename = "Share")]
    share: String,
}

/// Execute `markets list`.
pub async fn list(core: &SqliteCore, args: &ListArgs) -> Result<()> {
    let filter = MarketFilter {
        status: args.status,
        category: args.category.clone(),
        tournament_id: args.tournament.as_deref().map(TournamentId::from),
        include_test: args.include_test,
    };
    let mut markets = core.markets.list_markets(&filter).await?;
    if let Some(limit) = args.limit {
        markets.truncate(limit);
    }

    if output::is_json() {
        output::document(json!({
            "command": "markets.list",
            "markets": markets,
        }));
        return Ok(());
    }

    output::section("Markets");
    if markets.is_empty() {
        output::note("(no cached markets match)");
        return Ok(());
    }
    let rows: Vec<MarketRow> = markets.iter().map(MarketRow::from).collect();
    output::table(rows);
    Ok(())
}

/// Execute `markets show`.
pub async fn show(core: &SqliteCore, address: &str) -> Result<()> {
    let view = core.markets.get_market(&MarketAddress::from(address)).await?;

    if output::is_json() {
        output::document(json!({
            "command": "markets.show",
            "market": view.market,
            "freshness": view.freshness,
        }));
        return Ok(());
    }

    let market = &view.market;
    output::section("Market");
    output::field("Address", &market.address);
    output::field("Question", &market.question);
    if !market.category.is_empty() {
        output::field("Category", &market.category);
    }
    output::field("Status", output::status(market.status));
    if let Some(option) = market.resolved_option {
        let label = market
            .options
            .get(usize::from(option))
            .map_or("?", String::as_str);
        output::field("Winner", format!("{option} ({label})"));
    }
    output::field(
        "Volume",
        format!("{} ({})", output::amount(market.total_volume), market.volume_source),
    );
    output::field("Creator fee", format!("{} bps", market.creator_fee_bps));
    if let Some(date) = market.resolution_date {
        output::field("Resolves", date.to_rfc3339());
    }
    if let Some(tournament) = &market.tournament_id {
        output::field("Tournament", tournament);
    }

    output::section("Options");
    let rows: Vec<OptionRow> = market
        .options
        .iter()
        .zip(market.option_pools.iter())
        .zip(market.option_percentages())
        .enumerate()
        .map(|(index, ((label, pool), share))| OptionRow {
            index,
            label: label.clone(),
            pool: output::amount(*pool),
            share: format!("{}%", share.round_dp(1)),
        })
        .collect();
    output::table(rows);

    if view.is_stale() {
        output::warning("Ledger unavailable; showing the last cached values");
    }
    Ok(())
}

/// Execute `markets import`.
pub async fn import(core: &SqliteCore, path: &Path) -> Result<()> {
    let content = fs::read_to_string(path)?;
    let records: Vec<MarketRecord> = serde_json::from_str(&content)?;
    let report = core.markets.import(records).await?;

    if output::is_json() {
        output::document(json!({
            "command": "markets.import",
            "report": report,
        }));
        return Ok(());
    }

    output::success(&format!("Imported {} market(s)", report.imported));
    for rejected in &report.rejected {
        output::warning(rejected);
    }
    Ok(())
}

#[derive(Tabled)]
struct ResyncRow {
    #[tabled(rename = "Address")]
    address: String,
    #[tabled(rename = "Result")]
    result: String,
}

/// Execute `volumes resync`.
pub async fn resync(core: &SqliteCore) -> Result<()> {
    let report = core.markets.resync_volumes().await?;

    if output::is_json() {
        output::document(json!({
            "command": "volumes.resync",
            "updated": report.updated(),
            "failed": report.failed(),
            "entries": report.entries,
        }));
        return Ok(());
    }

    output::section("Volume resync");
    let rows: Vec<ResyncRow> = report
        .entries
        .iter()
        .map(|entry| ResyncRow {
            address: entry.address.to_string(),
            result: match &entry.result {
                ResyncResult::Updated { total, source } => {
                    output::good(format!("{} ({source})", output::amount(*total)))
                }
                ResyncResult::Failed { reason } => output::bad(reason),
            },
        })
        .collect();
    if !rows.is_empty() {
        output::table(rows);
    }
    output::field("Updated", report.updated());
    output::field("Failed", report.failed());
    Ok(())
}

/// Execute `volumes analyze`.
pub async fn analyze(core: &SqliteCore) -> Result<()> {
    let analysis = core.markets.analyze_volumes().await?;
    let threshold = core.markets.policy().low_volume_threshold;

    if output::is_json() {
        output::document(json!({
            "command": "volumes.analyze",
            "low_volume_threshold": threshold,
            "analysis": analysis,
        }));
        return Ok(());
    }

    output::section("Volume health");
    output::field("Active", analysis.total);
    output::field("Zero", analysis.zero_volume);
    output::field(
        "Low",
        format!("{} (< {})", analysis.low_volume, output::amount(threshold)),
    );
    output::field("Normal", analysis.normal_volume);
    if analysis.needs_sync.is_empty() {
        output::success("No markets need a resync");
    } else {
        output::section("Needs resync");
        for address in &analysis.needs_sync {
            output::note(&format!("- {address}"));
        }
    }
    Ok(())
}
