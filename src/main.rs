mod cli;

use crate::cli::args::Cli;
use clap::Parser;
use tracing::error;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    cli::logging::init_tracing(cli.debug, cli.no_color);

    if let Err(err) = cli::run(cli).await {
        error!("{:#}", err);
        std::process::exit(1);
    }
}
