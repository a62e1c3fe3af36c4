//! Fake [`Ledger`] with scripted accounts and outages.
//!
//! - [`ScriptedLedger::set`] installs or replaces an account.
//! - [`ScriptedLedger::fail_next`] makes the next `n` reads of one address
//!   fail with `UpstreamUnavailable`, then recovers.
//! - [`ScriptedLedger::set_down`] fails every read until cleared.
//!
//! Every read is counted, including failed ones.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use parking_lot::RwLock;

use crate::domain::id::MarketAddress;
use crate::domain::ledger::LedgerSnapshot;
use crate::error::{Error, Result};
use crate::port::outbound::ledger::Ledger;

#[derive(Default)]
pub struct ScriptedLedger {
    accounts: RwLock<HashMap<MarketAddress, LedgerSnapshot>>,
    failures: RwLock<HashMap<MarketAddress, u32>>,
    down: AtomicBool,
    reads: AtomicU32,
}

impl ScriptedLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`ScriptedLedger::set`].
    pub fn with_account(self, address: &str, snapshot: LedgerSnapshot) -> Self {
        self.set(address, snapshot);
        self
    }

    pub fn set(&self, address: &str, snapshot: LedgerSnapshot) {
        self.accounts
            .write()
            .insert(MarketAddress::from(address), snapshot);
    }

    pub fn remove(&self, address: &str) {
        self.accounts.write().remove(&MarketAddress::from(address));
    }

    /// Fail the next `count` reads of `address`.
    pub fn fail_next(&self, address: &str, count: u32) {
        self.failures
            .write()
            .insert(MarketAddress::from(address), count);
    }

    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    /// Total reads attempted so far.
    pub fn reads(&self) -> u32 {
        self.reads.load(Ordering::SeqCst)
    }

    fn scripted_failure(&self, address: &MarketAddress) -> bool {
        if self.down.load(Ordering::SeqCst) {
            return true;
        }
        let mut failures = self.failures.write();
        match failures.get_mut(address) {
            Some(remaining) if *remaining > 0 => {
                *remaining -= 1;
                true
            }
            _ => false,
        }
    }
}

impl Ledger for ScriptedLedger {
    async fn read(&self, address: &MarketAddress) -> Result<Option<LedgerSnapshot>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.scripted_failure(address) {
            return Err(Error::UpstreamUnavailable(format!(
                "scripted outage reading {address}"
            )));
        }
        Ok(self.accounts.read().get(address).cloned())
    }
}
