//! Ledger backed by a JSON export of raw market accounts.
//!
//! The export maps market address to the account as the chain stores it:
//!
//! ```json
//! { "9xQe...": { "status": 1, "winningOption": 0, "optionPools": [600000000, 400000000],
//!               "escrowBalance": 1000000000 } }
//! ```
//!
//! The file is re-read on every call so an external exporter can replace it
//! while the process runs.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::domain::id::MarketAddress;
use crate::domain::ledger::{LedgerAccount, LedgerSnapshot};
use crate::error::{Error, Result};
use crate::port::outbound::ledger::Ledger;

pub struct FileLedger {
    path: PathBuf,
    token_decimals: u32,
}

impl FileLedger {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, token_decimals: u32) -> Self {
        Self {
            path: path.into(),
            token_decimals,
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn accounts(&self) -> Result<HashMap<String, LedgerAccount>> {
        let raw = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            Error::UpstreamUnavailable(format!("ledger export {}: {e}", self.path.display()))
        })?;
        serde_json::from_str(&raw).map_err(|e| {
            Error::UpstreamUnavailable(format!("ledger export {} unreadable: {e}", self.path.display()))
        })
    }
}

impl Ledger for FileLedger {
    async fn read(&self, address: &MarketAddress) -> Result<Option<LedgerSnapshot>> {
        let mut accounts = self.accounts().await?;
        let Some(account) = accounts.remove(address.as_str()) else {
            debug!(market = %address, "No ledger account");
            return Ok(None);
        };
        account.into_snapshot(address, self.token_decimals).map(Some)
    }
}
