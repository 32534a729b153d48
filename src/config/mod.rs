//! Configuration for the roomkey binary.
//!
//! A single `roomkey.toml` file with three sections:
//!
//! ```toml
//! [world]
//! dir = "rooms"
//! format = "toml"          # or "line"
//!
//! [storage]                # optional; omit to play purely in memory
//! path = "data/adventure"
//! slot = "default"
//!
//! [logging]
//! level = "info"
//! file = "roomkey.log"     # optional; logs echo to the console on a TTY
//! ```
//!
//! `roomkey init` writes the default file; `--config` points at another one.

use std::fs;
use std::path::Path;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use crate::world::WorldFormat;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub world: WorldConfig,
    /// When absent, play runs purely in memory and nothing persists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage: Option<StorageConfig>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorldConfig {
    /// Directory holding the room definition files.
    pub dir: String,
    /// Definition file convention; every file in a world uses the same one.
    #[serde(default)]
    pub format: WorldFormat,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StorageConfig {
    /// Sled database directory.
    pub path: String,
    /// Session slot to resume or create; `play --slot` overrides.
    #[serde(default = "default_slot")]
    pub slot: String,
}

fn default_slot() -> String {
    "default".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Log level when no `-v` flags are given: error, warn, info, debug,
    /// trace.
    pub level: String,
    /// Append logs to this file instead of stderr.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            world: WorldConfig {
                dir: "rooms".to_string(),
                format: WorldFormat::Toml,
            },
            storage: Some(StorageConfig {
                path: "data/adventure".to_string(),
                slot: default_slot(),
            }),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path, e))?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file {}: {}", path, e))?;
        Ok(config)
    }

    /// Write the default configuration to `path` and return it. Refuses to
    /// clobber an existing file.
    pub fn create_default(path: &str) -> Result<Self> {
        if Path::new(path).exists() {
            return Err(anyhow!("config file {} already exists", path));
        }
        let config = Config::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| anyhow!("Failed to serialize default config: {}", e))?;
        fs::write(path, content)
            .map_err(|e| anyhow!("Failed to write config file {}: {}", path, e))?;
        Ok(config)
    }
}
