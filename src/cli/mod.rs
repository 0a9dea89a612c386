pub mod args;
pub mod logging;
pub mod one_shot;
pub mod provider;
pub mod service;

use anyhow::Result;
use args::{Cli, Command};
use clap::CommandFactory;
use hanging_droplets_cleaner::{AppVersion, Cleaner, CleanupReport};
use tracing::info;

pub async fn run(cli: Cli) -> Result<()> {
    if cli.version {
        print!("{}", AppVersion::current().extended());
        return Ok(());
    }

    info!("Starting {}", AppVersion::current().line());

    match cli.command {
        Some(Command::OneShot(args)) => one_shot::execute(args).await,
        Some(Command::Service(args)) => service::execute(args).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    }
}

/// Runs one cleanup pass and logs its outcome.
pub async fn run_pass(cleaner: &Cleaner) -> hanging_droplets_cleaner::Result<CleanupReport> {
    let report = cleaner.clean().await?;
    info!(
        hanging = report.hanging,
        pruned = report.pruned,
        "Finished droplets cleanup. Removed {} droplets",
        report.removed
    );
    Ok(report)
}
