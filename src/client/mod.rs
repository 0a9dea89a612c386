//! Remote droplet inventory.

pub mod digitalocean;

use crate::core::{PrefixMatcher, RemoteInstance, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;

pub use digitalocean::DigitalOceanClient;

/// Operations the cleaner needs from the cloud provider.
#[async_trait]
pub trait InventoryClient: Send + Sync {
    /// Lists droplets matching `matcher` that are at least `min_age` old.
    /// A zero `min_age` returns every matching droplet.
    async fn list(&self, matcher: &PrefixMatcher, min_age: Duration) -> Result<Vec<RemoteInstance>>;

    async fn stop(&self, instance: &RemoteInstance) -> Result<()>;

    async fn delete(&self, instance: &RemoteInstance) -> Result<()>;
}

/// Applies the prefix and minimal age filters to one page of droplets.
pub fn select_instances(
    instances: impl IntoIterator<Item = RemoteInstance>,
    matcher: &PrefixMatcher,
    min_age: Duration,
    now: DateTime<Utc>,
) -> Vec<RemoteInstance> {
    let min_age = if min_age.is_zero() {
        None
    } else {
        // Ages too large for chrono can never be reached.
        match chrono::Duration::from_std(min_age) {
            Ok(age) => Some(age),
            Err(_) => return Vec::new(),
        }
    };

    instances
        .into_iter()
        .filter(|instance| matcher.is_match(&instance.name))
        .filter(|instance| match min_age {
            None => true,
            Some(age) => now.signed_duration_since(instance.created_at) >= age,
        })
        .collect()
}
