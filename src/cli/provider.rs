use super::args::ProviderArgs;
use anyhow::{Context, Result, anyhow};
use hanging_droplets_cleaner::{Cleaner, CleanerConfig, DigitalOceanClient, MachinesFinder};
use std::sync::Arc;
use std::time::Duration;

impl ProviderArgs {
    pub fn cleaner_config(&self) -> CleanerConfig {
        CleanerConfig::new(self.runner_prefix.iter().cloned())
            .droplet_age(Duration::from_secs(self.droplet_age))
            .prune_zombies(!self.skip_zombie_pruning)
    }

    pub fn build_cleaner(&self) -> Result<Cleaner> {
        let token = self
            .digitalocean_token
            .as_deref()
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| anyhow!("Missing DigitalOcean API Token. Exiting"))?;

        let client = DigitalOceanClient::with_base_url(token, &self.digitalocean_api_url)
            .context("Failed to create DigitalOcean client")?;
        let store = MachinesFinder::new(&self.machines_directory);

        Cleaner::new(Arc::new(client), Arc::new(store), self.cleaner_config())
            .context("Failed to start HangingDropletsCleaner")
    }
}
