use thiserror::Error;

use crate::domain::deployment::ValidationError;
use crate::domain::id::{MarketAddress, TournamentId, WalletAddress};
use crate::domain::position::PositionKey;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("market not found: {0}")]
    NotFound(MarketAddress),

    #[error("position not found: {0}")]
    PositionNotFound(PositionKey),

    #[error("market {0} is not resolved")]
    NotResolved(MarketAddress),

    #[error("position {0} has already been claimed")]
    AlreadyClaimed(PositionKey),

    #[error("deployment rejected: {0}")]
    Validation(#[from] ValidationError),

    /// Recoverable read failure; callers may retry with backoff.
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Cached resolution disagrees with the ledger. Requires an operator.
    #[error("resolution conflict for {address}: cached option {cached}, ledger option {ledger}")]
    Conflict {
        address: MarketAddress,
        cached: u8,
        ledger: u8,
    },

    /// Payout inputs outside what can be settled (fee range, decimal range).
    #[error("cannot settle {address}: {reason}")]
    Settlement {
        address: MarketAddress,
        reason: String,
    },

    #[error("tournament not configured: {0}")]
    UnknownTournament(TournamentId),

    #[error("market {0} already exists")]
    DuplicateMarket(MarketAddress),

    #[error("caller {0} is not an authorized operator")]
    Unauthorized(WalletAddress),

    #[error("invalid ledger data for {address}: {reason}")]
    InvalidLedger {
        address: MarketAddress,
        reason: String,
    },

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("parse error: {0}")]
    Parse(String),
}

impl Error {
    /// True for failures a caller may retry (reads only).
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::UpstreamUnavailable(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
