//! Configuration schema for Icebox
//!
//! Configuration is stored at `~/.config/icebox/config.toml`

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Store settings
    pub store: StoreConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Enable verbose logging
    pub verbose: bool,

    /// Log format: "text" or "json"
    pub log_format: String,
}

impl GeneralConfig {
    /// Whether logs should be emitted as JSON
    pub fn json_logs(&self) -> bool {
        self.log_format.eq_ignore_ascii_case("json")
    }

    /// Effective verbosity given the `-v` flag count
    ///
    /// `verbose = true` in the config acts as a floor of one, so a config
    /// opting into verbose logging still gets info-level output without
    /// any flags.
    pub fn effective_verbosity(&self, flag_count: u8) -> u8 {
        if self.verbose {
            flag_count.max(1)
        } else {
            flag_count
        }
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            log_format: "text".to_string(),
        }
    }
}

/// Freeze store settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Storage root for the frozen artifacts
    pub root: PathBuf,

    /// Verify content hashes on every runtime read
    pub verify_on_read: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("frozen_store"),
            verify_on_read: true,
        }
    }
}
