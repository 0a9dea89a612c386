use super::args::ServiceArgs;
use super::run_pass;
use anyhow::{Context, Result};
use hanging_droplets_cleaner::Cleaner;
use hanging_droplets_cleaner::metrics::{MetricsServer, build_registry};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};

pub async fn execute(args: ServiceArgs) -> Result<()> {
    info!("Running in service mode");

    let interval = Duration::from_secs(args.interval);
    let mut cleaner = args.provider.build_cleaner()?;
    cleaner.enable_delete();

    info!("Droplets cleanup interval: {:?}", interval);

    let _metrics_server = match args.listen.as_deref().map(str::trim) {
        Some(listen) if !listen.is_empty() => {
            let registry = Arc::new(
                build_registry(cleaner.counters()).context("Failed to build metrics registry")?,
            );
            Some(
                MetricsServer::start(listen, registry)
                    .await
                    .context("Failed to start metrics server")?,
            )
        }
        _ => {
            info!("Metrics server disabled");
            None
        }
    };

    run_loop(&cleaner, interval, shutdown_signal()).await;
    Ok(())
}

/// Runs a pass immediately and then once per `interval` until `shutdown`
/// resolves. A pass is always awaited before the next tick is taken, so
/// passes never overlap.
pub async fn run_loop<F>(cleaner: &Cleaner, interval: Duration, shutdown: F) -> usize
where
    F: Future<Output = ()>,
{
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(shutdown);

    let mut passes = 0;
    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Shutting down droplets cleaner");
                break;
            }
            _ = ticker.tick() => {
                passes += 1;
                if let Err(err) = run_pass(cleaner).await {
                    error!("Error during cleanup: {}", err);
                }
            }
        }
    }
    passes
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "unable to install Ctrl+C signal handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!(error = %err, "unable to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
