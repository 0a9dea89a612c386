use clap::{Args, Parser, Subcommand};
use hanging_droplets_cleaner::DEFAULT_DROPLET_AGE_SECS;
use hanging_droplets_cleaner::client::digitalocean::DEFAULT_API_URL;
use std::path::PathBuf;

pub const DEFAULT_INTERVAL_SECS: u64 = 900;
pub const DEFAULT_MACHINES_DIRECTORY: &str = "/root/.docker/machine/machines";

#[derive(Parser, Debug)]
#[command(name = "hanging-droplets-cleaner")]
#[command(about = "Clears hanging droplets that are unmanaged by GitLab Runner")]
#[command(disable_version_flag = true)]
pub struct Cli {
    /// Set debug log-level
    #[arg(long, env = "DEBUG", global = true)]
    pub debug: bool,

    /// Disable output coloring
    #[arg(long, env = "NO_COLOR", global = true)]
    pub no_color: bool,

    /// Print version information
    #[arg(short = 'v', long)]
    pub version: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start hanging droplets cleaner as a service
    Service(ServiceArgs),
    /// Start hanging droplets cleaner in a one-shot mode
    OneShot(OneShotArgs),
}

#[derive(Args, Debug)]
pub struct ProviderArgs {
    /// DigitalOcean API Token
    #[arg(long, env = "DIGITALOCEAN_TOKEN", hide_env_values = true)]
    pub digitalocean_token: Option<String>,

    /// DigitalOcean API endpoint
    #[arg(long, env = "DIGITALOCEAN_API_URL", default_value = DEFAULT_API_URL)]
    pub digitalocean_api_url: String,

    /// Absolute path to directory where Docker Machine machines configuration is stored
    #[arg(long, env = "MACHINES_DIRECTORY", default_value = DEFAULT_MACHINES_DIRECTORY)]
    pub machines_directory: PathBuf,

    /// Minimal age of droplet that can be removed, in seconds
    #[arg(long, env = "DROPLET_AGE", default_value_t = DEFAULT_DROPLET_AGE_SECS)]
    pub droplet_age: u64,

    /// Prefix of runner's droplet name
    #[arg(long = "runner-prefix", required = true)]
    pub runner_prefix: Vec<String>,

    /// Do not remove machine folders whose droplet no longer exists
    #[arg(long)]
    pub skip_zombie_pruning: bool,
}

#[derive(Args, Debug)]
pub struct OneShotArgs {
    /// Delete droplets
    #[arg(long)]
    pub delete: bool,

    #[command(flatten)]
    pub provider: ProviderArgs,
}

#[derive(Args, Debug)]
pub struct ServiceArgs {
    /// Metrics server listen address
    #[arg(long, env = "LISTEN")]
    pub listen: Option<String>,

    /// Number of seconds between cleanup attempts
    #[arg(
        long,
        env = "INTERVAL",
        default_value_t = DEFAULT_INTERVAL_SECS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub interval: u64,

    #[command(flatten)]
    pub provider: ProviderArgs,
}
