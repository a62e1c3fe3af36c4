//! Infrastructure configuration modules.

pub mod ledger;
pub mod logging;
pub mod settings;
pub mod tournament;
pub mod volume;

pub use settings::Config;
