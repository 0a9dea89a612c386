use super::args::OneShotArgs;
use super::run_pass;
use anyhow::{Context, Result};
use std::io::{self, BufRead, Write};
use tracing::{info, warn};

pub async fn execute(args: OneShotArgs) -> Result<()> {
    info!("Running in one-shot mode");

    let mut cleaner = args.provider.build_cleaner()?;

    let confirmed =
        args.delete && run_blocking(|| confirm("Are you sure you want to delete droplets?")).await?;
    if confirmed {
        warn!("Running with 'delete' flag. All droplets matching requirements will be removed!");
        cleaner.enable_delete();
    } else {
        info!("Running without 'delete' flag. Will not remove any droplet.");
    }

    run_pass(&cleaner).await.context("Error during cleanup")?;
    Ok(())
}

/// Runs a blocking prompt on the tokio blocking pool.
async fn run_blocking<T, F>(prompt: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(prompt)
        .await
        .context("User prompt was interrupted")?
}

fn confirm(message: &str) -> Result<bool> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    confirm_with(&mut stdin.lock(), &mut stdout, message)
}

/// Prompts on `output` and reads one answer line from `input`.
pub fn confirm_with<R: BufRead, W: Write>(input: &mut R, output: &mut W, message: &str) -> Result<bool> {
    write!(output, "{} [yes/no] -> ", message)?;
    output.flush()?;

    let mut line = String::new();
    input
        .read_line(&mut line)
        .context("Error on reading user input")?;

    Ok(line.trim().eq_ignore_ascii_case("yes"))
}
