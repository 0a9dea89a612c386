use thiserror::Error;

#[derive(Error, Debug)]
pub enum CleanerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid runner prefix: {0}")]
    InvalidPrefix(#[from] regex::Error),

    #[error("I/O error on '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Missing machine configuration file '{0}'")]
    MissingMachineConfig(String),

    #[error("Malformed machine configuration '{path}': {message}")]
    MachineConfig { path: String, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("DigitalOcean API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),
}

impl CleanerError {
    pub fn io(path: impl AsRef<std::path::Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().display().to_string(),
            source,
        }
    }

    pub fn machine_config(path: impl AsRef<std::path::Path>, message: impl Into<String>) -> Self {
        Self::MachineConfig {
            path: path.as_ref().display().to_string(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CleanerError>;
