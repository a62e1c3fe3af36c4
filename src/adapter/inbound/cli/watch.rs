//! Handler for `watch`: periodic resolution sweeps with live standings.

use std::sync::Arc;
use std::time::Duration;

use tokio::signal;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info};

use super::{output, standings};
use crate::application::resolution::{BatchResult, SyncOutcome};
use crate::application::StandingsWatcher;
use crate::error::Result;
use crate::infrastructure::bootstrap::SqliteCore;

/// Execute `watch` until Ctrl-C.
pub async fn execute(core: &SqliteCore, interval_secs: u64) -> Result<()> {
    let watcher = Arc::new(StandingsWatcher::new(Arc::clone(&core.standings)));
    let task = Arc::clone(&watcher).spawn(core.events.subscribe());

    let mut ticker = interval(Duration::from_secs(interval_secs));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    output::note(&format!("Sweeping every {interval_secs}s, Ctrl-C to stop"));

    loop {
        tokio::select! {
            _ = ticker.tick() => sweep(core).await,
            _ = signal::ctrl_c() => {
                info!("Shutdown signal received");
                break;
            }
        }
    }
    task.abort();

    for tournament in core.standings.tournaments() {
        if let Some(latest) = watcher.latest(&tournament) {
            output::section(&format!("Standings: {tournament}"));
            standings::print_standings(&latest);
        }
    }
    Ok(())
}

async fn sweep(core: &SqliteCore) {
    let entries = match core.resolution.sync_all().await {
        Ok(entries) => entries,
        Err(err) => {
            error!(error = %err, "Resolution sweep failed");
            output::warning(&format!("Sweep failed: {err}"));
            return;
        }
    };

    for entry in &entries {
        match &entry.result {
            BatchResult::Synced(SyncOutcome::Resolved { option }) => {
                output::success(&format!("{} resolved, option {option}", entry.address));
            }
            BatchResult::Conflict { cached, ledger } => output::warning(&format!(
                "{} conflict: cached {cached}, ledger {ledger}",
                entry.address
            )),
            _ => {}
        }
    }
}
