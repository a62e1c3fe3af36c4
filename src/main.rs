use std::path::Path;

use anyhow::Context;
use clap::Parser;
use stakeline::adapter::inbound::cli::command::Cli;
use stakeline::adapter::inbound::cli::{dispatch, output};
use stakeline::infrastructure::config::settings::{Config, DEFAULT_CONFIG_PATH};
use tracing::debug;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    output::configure(output::OutputConfig::new(cli.json, cli.quiet));

    if let Err(e) = run(cli).await {
        output::error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(&cli.config)?;
    config.init_logging();
    debug!(config = %cli.config.display(), "stakeline starting");

    dispatch(cli.command, &cli.config, &config).await?;
    Ok(())
}

/// A missing default config file means "all defaults"; an explicit path must exist.
fn load_config(path: &Path) -> anyhow::Result<Config> {
    if path == Path::new(DEFAULT_CONFIG_PATH) && !path.exists() {
        return Config::parse_toml("").context("invalid default configuration");
    }
    Config::load(path).with_context(|| format!("failed to load config {}", path.display()))
}
