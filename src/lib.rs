// ============================================================================
// Hanging Droplets Cleaner Library
// ============================================================================

pub mod core;
pub mod machines;
pub mod client;
pub mod cleaner;
pub mod metrics;
pub mod version;

// Re-export main types for convenience
pub use core::{CleanerError, Machine, PrefixMatcher, RemoteInstance, Result};
pub use machines::{MachineStore, MachinesFinder};
pub use client::{DigitalOceanClient, InventoryClient, select_instances};
pub use cleaner::{
    Cleaner, CleanerConfig, CleanerCounters, CleanupReport, CountersSnapshot,
    DEFAULT_DROPLET_AGE_SECS,
};
pub use version::AppVersion;
