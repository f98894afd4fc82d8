use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Connection settings for the HTTP collaborator, loaded from a TOML file
/// owned by whatever embeds the library.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Server base URL, e.g. `http://media.local:8080/api`.
    pub base_url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    300
}

impl ClientConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),
}
