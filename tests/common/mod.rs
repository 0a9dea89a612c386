#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hanging_droplets_cleaner::{
    CleanerError, InventoryClient, Machine, MachineStore, PrefixMatcher, RemoteInstance, Result,
    select_instances,
};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

/// In-memory droplet inventory recording every remote call.
#[derive(Default)]
pub struct FakeClient {
    droplets: Mutex<Vec<RemoteInstance>>,
    fail_list_with_age: Mutex<bool>,
    fail_full_list: Mutex<bool>,
    stop_failures: Mutex<HashSet<String>>,
    delete_failures: Mutex<HashSet<String>>,
    list_calls: Mutex<Vec<Duration>>,
    stopped: Mutex<Vec<String>>,
    deleted: Mutex<Vec<String>>,
}

impl FakeClient {
    pub fn with_droplets(droplets: Vec<RemoteInstance>) -> Self {
        let client = Self::default();
        *client.droplets.lock().unwrap() = droplets;
        client
    }

    pub fn fail_stop(&self, name: &str) {
        self.stop_failures.lock().unwrap().insert(name.to_string());
    }

    pub fn fail_delete(&self, name: &str) {
        self.delete_failures.lock().unwrap().insert(name.to_string());
    }

    pub fn fail_aged_listing(&self) {
        *self.fail_list_with_age.lock().unwrap() = true;
    }

    pub fn fail_full_listing(&self) {
        *self.fail_full_list.lock().unwrap() = true;
    }

    pub fn stopped(&self) -> Vec<String> {
        self.stopped.lock().unwrap().clone()
    }

    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }

    pub fn list_calls(&self) -> Vec<Duration> {
        self.list_calls.lock().unwrap().clone()
    }
}

fn api_error() -> CleanerError {
    CleanerError::Api {
        status: 500,
        body: "boom".to_string(),
    }
}

#[async_trait]
impl InventoryClient for FakeClient {
    async fn list(&self, matcher: &PrefixMatcher, min_age: Duration) -> Result<Vec<RemoteInstance>> {
        self.list_calls.lock().unwrap().push(min_age);

        let failing = if min_age.is_zero() {
            *self.fail_full_list.lock().unwrap()
        } else {
            *self.fail_list_with_age.lock().unwrap()
        };
        if failing {
            return Err(api_error());
        }

        let droplets = self.droplets.lock().unwrap().clone();
        Ok(select_instances(droplets, matcher, min_age, Utc::now()))
    }

    async fn stop(&self, instance: &RemoteInstance) -> Result<()> {
        self.stopped.lock().unwrap().push(instance.name.clone());
        if self.stop_failures.lock().unwrap().contains(&instance.name) {
            return Err(api_error());
        }
        Ok(())
    }

    async fn delete(&self, instance: &RemoteInstance) -> Result<()> {
        self.deleted.lock().unwrap().push(instance.name.clone());
        if self.delete_failures.lock().unwrap().contains(&instance.name) {
            return Err(api_error());
        }
        Ok(())
    }
}

/// Machine records kept in memory; folders are materialised under
/// `directory` so pruning can be observed.
pub struct FakeStore {
    machines: Vec<Machine>,
    directory: PathBuf,
    fail: bool,
}

impl FakeStore {
    pub fn new(directory: &Path, machines: Vec<Machine>) -> Self {
        for machine in &machines {
            fs::create_dir_all(directory.join(&machine.name)).unwrap();
        }
        Self {
            machines,
            directory: directory.to_path_buf(),
            fail: false,
        }
    }

    pub fn failing(directory: &Path) -> Self {
        Self {
            machines: Vec::new(),
            directory: directory.to_path_buf(),
            fail: true,
        }
    }
}

impl MachineStore for FakeStore {
    fn list_machines(&self, matcher: &PrefixMatcher) -> Result<Vec<Machine>> {
        if self.fail {
            return Err(CleanerError::MissingMachineConfig("config.json".to_string()));
        }
        Ok(self
            .machines
            .iter()
            .filter(|machine| matcher.is_match(&machine.name))
            .cloned()
            .collect())
    }

    fn machines_directory(&self) -> &Path {
        &self.directory
    }
}

pub fn droplet(id: u64, name: &str, age_secs: i64) -> RemoteInstance {
    let created_at: DateTime<Utc> = Utc::now() - chrono::Duration::seconds(age_secs);
    RemoteInstance::new(id, name, created_at)
}
