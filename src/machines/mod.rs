//! Docker Machine records stored on the local filesystem.
//!
//! Every machine lives in its own directory under the machines directory
//! and carries a `config.json` whose `Driver.DropletID` links it to a
//! droplet once provisioning has finished.

use crate::core::{CleanerError, Machine, PrefixMatcher, Result};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const MACHINE_CONFIG_FILE: &str = "config.json";

/// Source of local machine records.
pub trait MachineStore: Send + Sync {
    /// Lists machines whose directory name matches `matcher`.
    fn list_machines(&self, matcher: &PrefixMatcher) -> Result<Vec<Machine>>;

    /// Directory holding one folder per machine.
    fn machines_directory(&self) -> &Path;
}

#[derive(Debug, Clone)]
pub struct MachinesFinder {
    machines_directory: PathBuf,
}

impl MachinesFinder {
    pub fn new(machines_directory: impl Into<PathBuf>) -> Self {
        Self {
            machines_directory: machines_directory.into(),
        }
    }

    fn read_droplet_id(&self, name: &str) -> Result<u64> {
        let config_path = self.machines_directory.join(name).join(MACHINE_CONFIG_FILE);
        if !config_path.is_file() {
            return Err(CleanerError::MissingMachineConfig(
                config_path.display().to_string(),
            ));
        }

        let raw = fs::read(&config_path).map_err(|e| CleanerError::io(&config_path, e))?;
        let parsed: Value = serde_json::from_slice(&raw)
            .map_err(|e| CleanerError::machine_config(&config_path, e.to_string()))?;

        parse_droplet_id(&parsed).map_err(|msg| CleanerError::machine_config(&config_path, msg))
    }
}

impl MachineStore for MachinesFinder {
    fn list_machines(&self, matcher: &PrefixMatcher) -> Result<Vec<Machine>> {
        let entries = fs::read_dir(&self.machines_directory)
            .map_err(|e| CleanerError::io(&self.machines_directory, e))?;

        let mut machines = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| CleanerError::io(&self.machines_directory, e))?;
            let file_type = entry
                .file_type()
                .map_err(|e| CleanerError::io(entry.path(), e))?;
            if !file_type.is_dir() {
                continue;
            }

            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if !matcher.is_match(&name) {
                continue;
            }

            let droplet_id = self.read_droplet_id(&name)?;
            debug!(machine = %name, droplet_id, "found machine");
            machines.push(Machine::new(name, droplet_id));
        }

        machines.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(machines)
    }

    fn machines_directory(&self) -> &Path {
        &self.machines_directory
    }
}

/// Extracts `Driver.DropletID`.
///
/// A record without a `Driver` section is not associated with a droplet yet
/// and yields `0`. Once the section exists the id must be present: a record
/// that cannot be read must never make a live droplet look hanging.
fn parse_droplet_id(config: &Value) -> std::result::Result<u64, String> {
    let Some(driver) = config.get("Driver").and_then(Value::as_object) else {
        return Ok(0);
    };

    match driver.get("DropletID") {
        None => Err("Driver section has no DropletID".to_string()),
        Some(Value::Null) => Err("DropletID is null".to_string()),
        Some(Value::Number(number)) => {
            if let Some(id) = number.as_u64() {
                return Ok(id);
            }
            match number.as_f64() {
                Some(f) if f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 => Ok(f as u64),
                _ => Err(format!("DropletID '{}' is not a valid droplet id", number)),
            }
        }
        Some(other) => Err(format!("DropletID must be a number, got {}", other)),
    }
}
