//! Prometheus exposition of the cleaner counters and build info.

pub mod server;

use crate::cleaner::CleanerCounters;
use crate::core::Result;
use crate::version::AppVersion;
use lazy_static::lazy_static;
use prometheus::core::{Collector, Desc};
use prometheus::proto::MetricFamily;
use prometheus::{Encoder, IntCounter, IntGaugeVec, Opts, Registry, TextEncoder};
use std::sync::{Arc, Mutex};

pub use server::{MetricsServer, metrics_router};

pub const REMOVED_DROPLETS_METRIC: &str = "hanging_droplets_cleaner_remove_droplets_total";
pub const STOP_ERRORS_METRIC: &str = "hanging_droplets_cleaner_stop_droplet_errors_total";
pub const DELETE_ERRORS_METRIC: &str = "hanging_droplets_cleaner_remove_droplet_errors_total";
pub const VERSION_INFO_METRIC: &str = "hanging_droplets_cleaner_version_info";

lazy_static! {
    static ref REMOVED_DROPLETS_OPTS: Opts =
        Opts::new(REMOVED_DROPLETS_METRIC, "Total number of removed droplets");
    static ref STOP_ERRORS_OPTS: Opts =
        Opts::new(STOP_ERRORS_METRIC, "Total number of droplets stopping errors");
    static ref DELETE_ERRORS_OPTS: Opts =
        Opts::new(DELETE_ERRORS_METRIC, "Total number of droplets removing errors");
}

/// Exposes [`CleanerCounters`] as Prometheus counters.
///
/// The cleaner owns the authoritative totals; on every scrape the exported
/// counters are advanced to the latest snapshot.
pub struct CleanerCollector {
    counters: Arc<CleanerCounters>,
    removed: IntCounter,
    stop_errors: IntCounter,
    delete_errors: IntCounter,
    scrape_lock: Mutex<()>,
}

impl CleanerCollector {
    pub fn new(counters: Arc<CleanerCounters>) -> Result<Self> {
        Ok(Self {
            counters,
            removed: IntCounter::with_opts(REMOVED_DROPLETS_OPTS.clone())?,
            stop_errors: IntCounter::with_opts(STOP_ERRORS_OPTS.clone())?,
            delete_errors: IntCounter::with_opts(DELETE_ERRORS_OPTS.clone())?,
            scrape_lock: Mutex::new(()),
        })
    }
}

fn advance_to(counter: &IntCounter, total: u64) {
    let current = counter.get();
    if total > current {
        counter.inc_by(total - current);
    }
}

impl Collector for CleanerCollector {
    fn desc(&self) -> Vec<&Desc> {
        let mut descs = self.removed.desc();
        descs.extend(self.stop_errors.desc());
        descs.extend(self.delete_errors.desc());
        descs
    }

    fn collect(&self) -> Vec<MetricFamily> {
        let _guard = self
            .scrape_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let snapshot = self.counters.snapshot();
        advance_to(&self.removed, snapshot.removed);
        advance_to(&self.stop_errors, snapshot.stop_errors);
        advance_to(&self.delete_errors, snapshot.delete_errors);

        let mut families = self.removed.collect();
        families.extend(self.stop_errors.collect());
        families.extend(self.delete_errors.collect());
        families
    }
}

/// Gauge with a constant `1` labelled by the build metadata.
pub fn version_collector(version: &AppVersion) -> Result<IntGaugeVec> {
    let labels = version.labels();
    let label_names: Vec<&str> = labels.iter().map(|(name, _)| *name).collect();
    let label_values: Vec<&str> = labels.iter().map(|(_, value)| value.as_str()).collect();

    let gauge = IntGaugeVec::new(
        Opts::new(
            VERSION_INFO_METRIC,
            "A metric with a constant '1' value labeled by different build stats fields.",
        ),
        &label_names,
    )?;
    gauge.with_label_values(&label_values).set(1);
    Ok(gauge)
}

/// Registry with the version gauge, the cleaner counters and, on Linux,
/// the `process_*` metrics of the running binary.
pub fn build_registry(counters: Arc<CleanerCounters>) -> Result<Registry> {
    let registry = Registry::new();
    registry.register(Box::new(version_collector(AppVersion::current())?))?;
    registry.register(Box::new(CleanerCollector::new(counters)?))?;

    #[cfg(target_os = "linux")]
    registry.register(Box::new(
        prometheus::process_collector::ProcessCollector::for_self(),
    ))?;

    Ok(registry)
}

/// Export metrics in Prometheus text format.
pub fn export_metrics(registry: &Registry) -> Result<String> {
    let encoder = TextEncoder::new();
    let metric_families = registry.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}
