//! CLI module graph and dispatch.

pub mod command;
pub mod config;
pub mod deploy;
pub mod market;
pub mod output;
pub mod resolution;
pub mod settlement;
pub mod standings;
pub mod watch;

use std::path::Path;

use command::{
    Commands, ConfigCommand, DeployCommand, MarketsCommand, StakesCommand, VolumesCommand,
    WalletCommand,
};

use crate::error::Result;
use crate::infrastructure::bootstrap::{self, SqliteCore};
use crate::infrastructure::config::settings::Config;

/// Run one parsed command against `config`.
///
/// Commands that only read files never open the database.
///
/// # Errors
///
/// Returns the first error raised by the command.
pub async fn dispatch(command: Commands, config_path: &Path, config: &Config) -> Result<()> {
    match command {
        Commands::Markets(MarketsCommand::List(args)) => market::list(&open(config)?, &args).await,
        Commands::Markets(MarketsCommand::Show(arg)) => {
            market::show(&open(config)?, &arg.address).await
        }
        Commands::Markets(MarketsCommand::Import(arg)) => {
            market::import(&open(config)?, &arg.file).await
        }
        Commands::Sync(args) => resolution::execute(&open(config)?, &args).await,
        Commands::Volumes(VolumesCommand::Resync) => market::resync(&open(config)?).await,
        Commands::Volumes(VolumesCommand::Analyze) => market::analyze(&open(config)?).await,
        Commands::Payout(args) => settlement::payout(&open(config)?, &args).await,
        Commands::Claim(args) => settlement::claim(&open(config)?, &args).await,
        Commands::Settlement(arg) => settlement::summary(&open(config)?, &arg.address).await,
        Commands::Stakes(StakesCommand::Import(arg)) => {
            settlement::import_stakes(&open(config)?, &arg.file).await
        }
        Commands::Stakes(StakesCommand::List(arg)) => {
            settlement::list_stakes(&open(config)?, &arg.address).await
        }
        Commands::Wallet(WalletCommand::Stats(arg)) => {
            settlement::wallet_stats(&open(config)?, &arg.owner).await
        }
        Commands::Standings(args) => {
            standings::execute(&open(config)?, args.tournament.as_deref()).await
        }
        Commands::Watch(args) => watch::execute(&open(config)?, args.interval_secs).await,
        Commands::Deploy(DeployCommand::Check(args)) => deploy::check(&args),
        Commands::Deploy(DeployCommand::Apply(args)) => {
            deploy::apply(&open(config)?, &args.selection, &args.caller).await
        }
        Commands::Config(ConfigCommand::Validate) => {
            config::execute_validate(config_path, config);
            Ok(())
        }
        Commands::Config(ConfigCommand::Show) => {
            config::execute_show(config);
            Ok(())
        }
    }
}

fn open(config: &Config) -> Result<SqliteCore> {
    bootstrap::build(config)
}
