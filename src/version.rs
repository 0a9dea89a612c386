//! Build metadata reported at startup, in `--version` and as a metric.

use chrono::{DateTime, Utc};
use std::sync::OnceLock;

pub const NAME: &str = "hanging-droplets-cleaner";

#[derive(Debug, Clone)]
pub struct AppVersion {
    pub name: String,
    pub version: String,
    pub revision: String,
    pub branch: String,
    pub built_at: DateTime<Utc>,
    pub os: String,
    pub architecture: String,
}

impl AppVersion {
    /// Version of the running binary.
    ///
    /// `GIT_REVISION`, `GIT_BRANCH` and `BUILT_AT` (RFC 3339) are read at
    /// compile time when the build sets them.
    pub fn current() -> &'static AppVersion {
        static CURRENT: OnceLock<AppVersion> = OnceLock::new();
        CURRENT.get_or_init(|| {
            let built_at = option_env!("BUILT_AT")
                .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
                .map(|ts| ts.with_timezone(&Utc))
                .unwrap_or_else(Utc::now);

            AppVersion {
                name: NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                revision: option_env!("GIT_REVISION").unwrap_or("HEAD").to_string(),
                branch: option_env!("GIT_BRANCH").unwrap_or("HEAD").to_string(),
                built_at,
                os: std::env::consts::OS.to_string(),
                architecture: std::env::consts::ARCH.to_string(),
            }
        })
    }

    pub fn user_agent(&self) -> String {
        format!(
            "{} {} ({}; {}/{})",
            self.name, self.version, self.branch, self.os, self.architecture
        )
    }

    pub fn line(&self) -> String {
        format!("{} {} ({})", self.name, self.version, self.revision)
    }

    pub fn extended(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("Version:      {}\n", self.version));
        out.push_str(&format!("Git revision: {}\n", self.revision));
        out.push_str(&format!("Git branch:   {}\n", self.branch));
        out.push_str(&format!("Built:        {}\n", self.built_at.to_rfc2822()));
        out.push_str(&format!("OS/Arch:      {}/{}\n", self.os, self.architecture));
        out
    }

    /// Label pairs for the build info gauge, in a stable order.
    pub fn labels(&self) -> Vec<(&'static str, String)> {
        vec![
            ("name", self.name.clone()),
            ("version", self.version.clone()),
            ("revision", self.revision.clone()),
            ("branch", self.branch.clone()),
            ("built_at", self.built_at.to_rfc3339()),
            ("os", self.os.clone()),
            ("architecture", self.architecture.clone()),
        ]
    }
}
