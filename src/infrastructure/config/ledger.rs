//! Ledger export location and token precision.

use serde::Deserialize;

/// Where the authoritative ledger export lives.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    /// JSON export of raw market accounts keyed by address.
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: String,
    /// Decimals of the stake token (6 on devnet, 9 on mainnet).
    #[serde(default = "default_token_decimals")]
    pub token_decimals: u32,
}

fn default_snapshot_path() -> String {
    "ledger.json".into()
}

fn default_token_decimals() -> u32 {
    9
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            snapshot_path: default_snapshot_path(),
            token_decimals: default_token_decimals(),
        }
    }
}

/// Ledger snapshot caching.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Seconds a ledger read is reused. Zero disables caching.
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

fn default_ttl_secs() -> u64 {
    30
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
        }
    }
}
