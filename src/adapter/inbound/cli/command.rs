//! Command-line interface definitions.
//!
//! Defines the operator CLI for inspecting cached markets, syncing them with
//! the ledger, previewing and recording claims, and deriving standings.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::market::MarketStatus;
use crate::infrastructure::config::settings::DEFAULT_CONFIG_PATH;

/// Settlement and reconciliation tools for a staked prediction market
#[derive(Parser, Debug)]
#[command(name = "stakeline")]
#[command(version)]
pub struct Cli {
    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Decrease output verbosity
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the configuration file
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Inspect and import cached markets
    #[command(subcommand)]
    Markets(MarketsCommand),

    /// Pull resolutions from the ledger into the cache
    Sync(SyncArgs),

    /// Reconcile and analyze market volumes
    #[command(subcommand)]
    Volumes(VolumesCommand),

    /// Preview the payout of one position
    Payout(PositionArgs),

    /// Claim the payout of one winning position
    Claim(PositionArgs),

    /// Show the full distribution of a resolved market
    Settlement(AddressArg),

    /// Record stakes and inspect positions
    #[command(subcommand)]
    Stakes(StakesCommand),

    /// Per-wallet statistics
    #[command(subcommand)]
    Wallet(WalletCommand),

    /// Derive group-stage standings for a tournament
    Standings(StandingsArgs),

    /// Sweep open markets for resolutions until interrupted
    Watch(WatchArgs),

    /// Select outcomes and deploy external markets
    #[command(subcommand)]
    Deploy(DeployCommand),

    /// Inspect configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

/// Subcommands for `stakeline markets`.
#[derive(Subcommand, Debug)]
pub enum MarketsCommand {
    /// List cached markets, newest first.
    List(ListArgs),
    /// Show one market merged with the ledger.
    Show(AddressArg),
    /// Import market records from a JSON array file.
    Import(FileArg),
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Only markets with this status
    #[arg(long)]
    pub status: Option<MarketStatus>,

    /// Only markets in this category
    #[arg(long)]
    pub category: Option<String>,

    /// Only markets of this tournament
    #[arg(long)]
    pub tournament: Option<String>,

    /// Include seeded test markets
    #[arg(long)]
    pub include_test: bool,

    /// Show at most this many markets
    #[arg(long)]
    pub limit: Option<usize>,
}

#[derive(Args, Debug)]
pub struct AddressArg {
    /// Market address
    pub address: String,
}

#[derive(Args, Debug)]
pub struct FileArg {
    /// Path to a JSON file
    pub file: PathBuf,
}

#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Market to sync
    #[arg(required_unless_present = "all", conflicts_with = "all")]
    pub address: Option<String>,

    /// Sync every open market
    #[arg(long)]
    pub all: bool,

    /// Compare cache and ledger without writing
    #[arg(long)]
    pub check: bool,
}

/// Subcommands for `stakeline volumes`.
#[derive(Subcommand, Debug)]
pub enum VolumesCommand {
    /// Re-read every market from the ledger and persist reconciled volumes.
    Resync,
    /// Report zero, low and normal volume counts over active markets.
    Analyze,
}

#[derive(Args, Debug)]
pub struct PositionArgs {
    /// Market address
    pub market: String,
    /// Owner wallet
    pub owner: String,
    /// Option index the stake was placed on
    pub option: u8,
}

/// Subcommands for `stakeline stakes`.
#[derive(Subcommand, Debug)]
pub enum StakesCommand {
    /// Record stakes from a JSON array file.
    Import(FileArg),
    /// List the positions of a market.
    List(AddressArg),
}

/// Subcommands for `stakeline wallet`.
#[derive(Subcommand, Debug)]
pub enum WalletCommand {
    /// Totals, win/loss counts and realized profit of one wallet.
    Stats(WalletArg),
}

#[derive(Args, Debug)]
pub struct WalletArg {
    /// Wallet address
    pub owner: String,
}

#[derive(Args, Debug)]
pub struct StandingsArgs {
    /// Tournament id; lists configured tournaments when omitted
    pub tournament: Option<String>,
}

#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Seconds between resolution sweeps
    #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u64).range(1..))]
    pub interval_secs: u64,
}

/// Subcommands for `stakeline deploy`.
#[derive(Subcommand, Debug)]
pub enum DeployCommand {
    /// Validate an outcome selection without deploying.
    Check(DeployArgs),
    /// Deploy a candidate market as a new active market.
    Apply(DeployApplyArgs),
}

#[derive(Args, Debug)]
pub struct DeployArgs {
    /// Candidate market JSON file
    pub candidate: PathBuf,

    /// Outcome label to deploy (repeatable, in deployment order)
    #[arg(short, long = "select")]
    pub select: Vec<String>,
}

#[derive(Args, Debug)]
pub struct DeployApplyArgs {
    #[command(flatten)]
    pub selection: DeployArgs,

    /// Operator wallet performing the deployment
    #[arg(long)]
    pub caller: String,
}

/// Subcommands for `stakeline config`.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Display the effective configuration with defaults applied.
    Show,
    /// Validate the configuration file.
    Validate,
}
