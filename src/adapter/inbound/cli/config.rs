//! Handler for the `config` command group.

use std::path::Path;

use serde_json::json;

use super::output;
use crate::infrastructure::config::settings::Config;

/// Execute `config validate`. Loading already validated the file.
pub fn execute_validate(path: &Path, config: &Config) {
    if output::is_json() {
        output::document(json!({
            "command": "config.validate",
            "path": path.display().to_string(),
            "valid": true,
            "tournaments": config.tournaments.len(),
        }));
        return;
    }

    output::success(&format!("{} is valid", path.display()));
}

/// Execute `config show`.
pub fn execute_show(config: &Config) {
    if output::is_json() {
        output::document(json!({
            "command": "config.show",
            "database": config.database.url,
            "ledger": {
                "snapshot_path": config.ledger.snapshot_path,
                "token_decimals": config.ledger.token_decimals,
            },
            "cache_ttl_secs": config.cache.ttl_secs,
            "retry": {
                "max_attempts": config.retry.max_attempts,
                "initial_delay_ms": config.retry.initial_delay_ms,
                "max_delay_ms": config.retry.max_delay_ms,
                "backoff_multiplier": config.retry.backoff_multiplier,
            },
            "volume": {
                "fallback_display": config.volume.fallback_display,
                "low_volume_threshold": config.volume.low_volume_threshold,
            },
            "operators": config.operators.allowlist.len(),
            "tournaments": config.tournaments.iter().map(|t| &t.id).collect::<Vec<_>>(),
        }));
        return;
    }

    output::section("Effective Configuration");
    output::field("Database", &config.database.url);

    output::section("Ledger");
    output::field("Snapshot", &config.ledger.snapshot_path);
    output::field("Decimals", config.ledger.token_decimals);
    output::field("Cache TTL", format!("{}s", config.cache.ttl_secs));
    output::field(
        "Retry",
        format!(
            "{} attempts, {}-{}ms, x{}",
            config.retry.max_attempts,
            config.retry.initial_delay_ms,
            config.retry.max_delay_ms,
            config.retry.backoff_multiplier
        ),
    );

    output::section("Volume");
    output::field(
        "Fallback",
        config
            .volume
            .fallback_display
            .map_or_else(|| "min bet".to_string(), output::amount),
    );
    output::field("Low below", output::amount(config.volume.low_volume_threshold));

    output::section("Operators");
    if config.operators.allowlist.is_empty() {
        output::note("(none; deployment is disabled)");
    }
    for wallet in &config.operators.allowlist {
        output::note(&format!("- {wallet}"));
    }

    output::section("Tournaments");
    if config.tournaments.is_empty() {
        output::note("(none)");
    }
    for tournament in &config.tournaments {
        output::note(&format!(
            "- {} ({} fixtures)",
            tournament.id,
            tournament.matches.len()
        ));
    }
}
