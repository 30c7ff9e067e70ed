/// Serializable history settings a host can keep in its own config file.
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Default timeline bound. 0 = unbounded.
const DEFAULT_CAPACITY: usize = 0;

/// Configuration for a `HistoryManager`.
///
/// Only the plain-data settings live here. Hooks (compare, duplicate,
/// on_change) are code and go through `HistoryOptions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Max number of retained snapshots. 0 = unbounded.
    pub capacity: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
        }
    }
}

impl HistoryConfig {
    /// Parses a config from a JSON document. Missing fields take defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if `json` is not a valid config document.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse history config")
    }

    /// Reads and parses a config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read history config at {}", path.display()))?;
        Self::from_json(&contents)
            .with_context(|| format!("Invalid history config at {}", path.display()))
    }

    /// Loads a config file, returning defaults on any error.
    ///
    /// Never creates or overwrites the file.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Using default history config: {e:#}");
                Self::default()
            }
        }
    }

    /// Saves the config as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the disk write fails.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json =
            serde_json::to_string_pretty(self).context("Failed to serialize history config")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write history config to {}", path.display()))
    }
}
