//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all settings.
//! Configuration is loaded from a TOML file; `STAKELINE_DATABASE_URL`
//! overrides the database location.
//!
//! # Example
//!
//! ```no_run
//! use stakeline::infrastructure::config::settings::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("stakeline.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use rust_decimal::Decimal;
use serde::Deserialize;

use super::ledger::{CacheConfig, LedgerConfig};
use super::logging::LoggingConfig;
use super::tournament::TournamentConfig;
use super::volume::VolumeConfig;
use crate::application::retry::RetryPolicy;
use crate::domain::id::WalletAddress;
use crate::error::{ConfigError, Result};

/// Default config file name looked up in the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "stakeline.toml";

/// Environment variable that overrides `[database] url`.
pub const DATABASE_URL_ENV: &str = "STAKELINE_DATABASE_URL";

/// Largest token precision the ledger can report.
const MAX_TOKEN_DECIMALS: u32 = 18;

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub url: String,
}

fn default_database_url() -> String {
    "stakeline.db".into()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
        }
    }
}

/// Wallets allowed to use write paths such as deployment.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OperatorsConfig {
    #[serde(default)]
    pub allowlist: Vec<String>,
}

impl OperatorsConfig {
    #[must_use]
    pub fn wallets(&self) -> Vec<WalletAddress> {
        self.allowlist
            .iter()
            .map(|w| WalletAddress::from(w.trim()))
            .collect()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub ledger: LedgerConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub retry: RetryPolicy,
    #[serde(default)]
    pub volume: VolumeConfig,
    #[serde(default)]
    pub operators: OperatorsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub tournaments: Vec<TournamentConfig>,
}

impl Config {
    /// Parse configuration from TOML content, applying environment overrides.
    ///
    /// # Errors
    /// Returns an error if the TOML is invalid or validation fails.
    pub fn parse_toml(content: &str) -> Result<Self> {
        Self::parse_toml_with_env(content, |key| std::env::var(key).ok())
    }

    /// Parse with an explicit environment lookup.
    ///
    /// # Errors
    /// Returns an error if the TOML is invalid or validation fails.
    pub fn parse_toml_with_env(
        content: &str,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let mut config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;

        if let Some(url) = env(DATABASE_URL_ENV).filter(|u| !u.trim().is_empty()) {
            config.database.url = url;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Validate configuration values.
    fn validate(&self) -> Result<()> {
        if self.database.url.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "database.url",
            }
            .into());
        }
        if self.ledger.snapshot_path.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "ledger.snapshot_path",
            }
            .into());
        }
        if self.ledger.token_decimals > MAX_TOKEN_DECIMALS {
            return Err(ConfigError::InvalidValue {
                field: "ledger.token_decimals",
                reason: format!("must be at most {MAX_TOKEN_DECIMALS}"),
            }
            .into());
        }
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "retry.max_attempts",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if self.retry.max_delay_ms < self.retry.initial_delay_ms {
            return Err(ConfigError::InvalidValue {
                field: "retry.max_delay_ms",
                reason: "must be >= initial_delay_ms".to_string(),
            }
            .into());
        }
        if self.retry.backoff_multiplier < 1.0 {
            return Err(ConfigError::InvalidValue {
                field: "retry.backoff_multiplier",
                reason: "must be >= 1.0".to_string(),
            }
            .into());
        }
        if self.volume.low_volume_threshold < Decimal::ZERO {
            return Err(ConfigError::InvalidValue {
                field: "volume.low_volume_threshold",
                reason: "must be 0 or greater".to_string(),
            }
            .into());
        }
        if self.volume.fallback_display.is_some_and(|v| v <= Decimal::ZERO) {
            return Err(ConfigError::InvalidValue {
                field: "volume.fallback_display",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(ConfigError::InvalidValue {
                field: "logging.format",
                reason: "must be \"pretty\" or \"json\"".to_string(),
            }
            .into());
        }

        let mut seen = HashSet::new();
        for tournament in &self.tournaments {
            if tournament.id.trim().is_empty() {
                return Err(ConfigError::MissingField {
                    field: "tournaments.id",
                }
                .into());
            }
            if !seen.insert(tournament.id.as_str()) {
                return Err(ConfigError::InvalidValue {
                    field: "tournaments.id",
                    reason: format!("duplicate tournament id '{}'", tournament.id),
                }
                .into());
            }
            if tournament
                .matches
                .iter()
                .any(|m| m.home.trim().is_empty() || m.away.trim().is_empty() || m.home == m.away)
            {
                return Err(ConfigError::InvalidValue {
                    field: "tournaments.matches",
                    reason: format!("tournament '{}' has a fixture without two teams", tournament.id),
                }
                .into());
            }
        }
        Ok(())
    }

    /// Initialize tracing from `[logging]`.
    pub fn init_logging(&self) {
        self.logging.init();
    }

    /// Ledger cache time-to-live.
    #[must_use]
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache.ttl_secs)
    }
}
