//! Reconciliation of droplets against local Docker Machine records.

pub mod counters;

use crate::client::InventoryClient;
use crate::core::{Machine, PrefixMatcher, RemoteInstance, Result};
use crate::machines::MachineStore;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

pub use counters::{CleanerCounters, CountersSnapshot};

pub const DEFAULT_DROPLET_AGE_SECS: u64 = 900;

#[derive(Debug, Clone)]
pub struct CleanerConfig {
    pub runner_prefixes: Vec<String>,
    /// Droplets younger than this are left alone; they may still be
    /// provisioning and not have written their machine record yet.
    pub droplet_age: Duration,
    pub prune_zombies: bool,
}

impl CleanerConfig {
    pub fn new<I, S>(runner_prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            runner_prefixes: runner_prefixes.into_iter().map(Into::into).collect(),
            droplet_age: Duration::from_secs(DEFAULT_DROPLET_AGE_SECS),
            prune_zombies: true,
        }
    }

    pub fn droplet_age(mut self, droplet_age: Duration) -> Self {
        self.droplet_age = droplet_age;
        self
    }

    pub fn prune_zombies(mut self, prune_zombies: bool) -> Self {
        self.prune_zombies = prune_zombies;
        self
    }
}

/// Outcome of a single cleanup pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupReport {
    /// Droplets classified as hanging, whether or not they were removed.
    pub hanging: usize,
    /// Droplets successfully deleted in this pass.
    pub removed: u64,
    /// Zombie machine folders removed in this pass.
    pub pruned: usize,
}

pub struct Cleaner {
    client: Arc<dyn InventoryClient>,
    store: Arc<dyn MachineStore>,
    matcher: PrefixMatcher,
    droplet_age: Duration,
    prune_zombies: bool,
    delete: bool,
    counters: Arc<CleanerCounters>,
}

impl Cleaner {
    pub fn new(
        client: Arc<dyn InventoryClient>,
        store: Arc<dyn MachineStore>,
        config: CleanerConfig,
    ) -> Result<Self> {
        let matcher = PrefixMatcher::new(config.runner_prefixes)?;
        info!("Droplet minimal age: {:?}", config.droplet_age);

        Ok(Self {
            client,
            store,
            matcher,
            droplet_age: config.droplet_age,
            prune_zombies: config.prune_zombies,
            delete: false,
            counters: Arc::new(CleanerCounters::new()),
        })
    }

    /// Switches to destructive mode. There is no way back.
    pub fn enable_delete(&mut self) {
        self.delete = true;
    }

    pub fn is_delete_enabled(&self) -> bool {
        self.delete
    }

    pub fn counters(&self) -> Arc<CleanerCounters> {
        Arc::clone(&self.counters)
    }

    /// Runs one cleanup pass.
    ///
    /// Listing failures abort the pass. Stop and delete failures are
    /// counted and never interrupt the remaining droplets.
    pub async fn clean(&self) -> Result<CleanupReport> {
        info!("Starting droplets cleanup");
        let mut report = CleanupReport::default();

        let machines = self.store.list_machines(&self.matcher)?;
        debug!("Found {} machines matching prefixes", machines.len());

        let droplets = self.client.list(&self.matcher, self.droplet_age).await?;
        debug!("Found {} droplets matching prefixes", droplets.len());

        if droplets.is_empty() {
            return Ok(report);
        }

        let hanging = hanging_droplets(&droplets, &machines);
        report.hanging = hanging.len();
        for droplet in hanging {
            if self.stop_and_delete_droplet(droplet).await {
                report.removed += 1;
            }
        }

        if self.prune_zombies {
            info!("Cleaning up zombie folders");
            let all_droplets = self.client.list(&self.matcher, Duration::ZERO).await?;
            info!("Got {} droplets to sync with folders", all_droplets.len());

            for machine in zombie_machines(&all_droplets, &machines) {
                info!(machine = %machine.name, "Going to clean machine folder");
                if self.clean_machine_folder(&machine.name).await {
                    report.pruned += 1;
                }
            }
        }

        Ok(report)
    }

    /// Returns true when the droplet was deleted.
    async fn stop_and_delete_droplet(&self, droplet: &RemoteInstance) -> bool {
        info!(
            "Will stop and delete: {} (created_at: {})",
            droplet.name,
            droplet.created_at.to_rfc3339()
        );
        if !self.delete {
            return false;
        }

        self.stop_droplet(droplet).await;
        let deleted = self.delete_droplet(droplet).await;
        self.clean_machine_folder(&droplet.name).await;
        deleted
    }

    async fn stop_droplet(&self, droplet: &RemoteInstance) {
        debug!("Stopping droplet '{}'", droplet.name);
        if let Err(err) = self.client.stop(droplet).await {
            self.counters.on_stop_error();
            error!("Error while stopping droplet '{}': {}", droplet.name, err);
        }
    }

    async fn delete_droplet(&self, droplet: &RemoteInstance) -> bool {
        debug!("Deleting droplet '{}'", droplet.name);
        match self.client.delete(droplet).await {
            Ok(()) => {
                self.counters.on_removed();
                true
            }
            Err(err) => {
                self.counters.on_delete_error();
                error!("Error while deleting droplet '{}': {}", droplet.name, err);
                false
            }
        }
    }

    /// Removes `<machines_directory>/<name>` if present. Returns true when a
    /// folder was removed.
    async fn clean_machine_folder(&self, name: &str) -> bool {
        if !is_plain_folder_name(name) {
            warn!(machine = %name, "Refusing to clean machine folder with unsafe name");
            return false;
        }

        let path = self.store.machines_directory().join(name);
        match tokio::fs::try_exists(&path).await {
            Ok(true) => {}
            Ok(false) => return false,
            Err(err) => {
                warn!("Failed checking folder {}: {}", path.display(), err);
                return false;
            }
        }

        info!("Cleaning up the Docker Machine folder: {}", path.display());
        match tokio::fs::remove_dir_all(&path).await {
            Ok(()) => true,
            Err(err) => {
                warn!("Failed cleaning up folder {}: {}", path.display(), err);
                false
            }
        }
    }
}

fn is_plain_folder_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && Path::new(name).components().count() == 1
        && !name.contains(['/', '\\'])
}

/// Droplets with no machine record holding a droplet id under the same name.
pub fn hanging_droplets<'a>(
    droplets: &'a [RemoteInstance],
    machines: &[Machine],
) -> Vec<&'a RemoteInstance> {
    let tracked: HashSet<&str> = machines
        .iter()
        .filter(|machine| machine.is_tracked())
        .map(|machine| machine.name.as_str())
        .collect();

    droplets
        .iter()
        .filter(|droplet| !tracked.contains(droplet.name.as_str()))
        .collect()
}

/// Machines whose name does not appear in the full droplet listing.
pub fn zombie_machines<'a>(droplets: &[RemoteInstance], machines: &'a [Machine]) -> Vec<&'a Machine> {
    let names: HashSet<&str> = droplets.iter().map(|droplet| droplet.name.as_str()).collect();

    machines
        .iter()
        .filter(|machine| !names.contains(machine.name.as_str()))
        .collect()
}
