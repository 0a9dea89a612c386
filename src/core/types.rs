use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A droplet as reported by the cloud provider.
///
/// `name` is the only field used to correlate a droplet with a local
/// machine record; `id` addresses the stop and delete calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteInstance {
    pub id: u64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl RemoteInstance {
    pub fn new(id: u64, name: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name: name.into(),
            created_at,
        }
    }
}

/// A Docker Machine record found in the machines directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Machine {
    pub name: String,
    /// `0` until the provisioner has stored the droplet id.
    pub droplet_id: u64,
}

impl Machine {
    pub fn new(name: impl Into<String>, droplet_id: u64) -> Self {
        Self {
            name: name.into(),
            droplet_id,
        }
    }

    pub fn is_tracked(&self) -> bool {
        self.droplet_id != 0
    }
}
