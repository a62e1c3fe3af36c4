//! Ledger adapters.

pub mod file;

pub use file::FileLedger;
