//! Application configuration
//!
//! Defaults work out of the box against `./data` and `./assets`. A TOML
//! file may override any field, and `HGIVE_DATA_DIR` overrides the data
//! directory last.

use crate::error::{GiveError, GiveResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding [`GiveConfig::data_dir`]
pub const DATA_DIR_ENV: &str = "HGIVE_DATA_DIR";

/// HederaGive configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GiveConfig {
    /// Directory holding the JSON collections
    pub data_dir: PathBuf,
    /// Directory holding campaign images
    pub assets_dir: PathBuf,
    /// Image used when a named asset is missing
    pub default_image: String,
    /// Smallest donation accepted from the dashboard
    pub min_donation: f64,
    /// Campaigns shown on the home page
    pub featured_count: usize,
    /// `tracing` filter directive used by the binary
    pub log_filter: String,
    /// Mock ledger parameters
    pub ledger: LedgerConfig,
}

impl GiveConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With data directory
    #[inline]
    #[must_use]
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    /// With assets directory
    #[inline]
    #[must_use]
    pub fn with_assets_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.assets_dir = dir.into();
        self
    }

    /// With ledger parameters
    #[inline]
    #[must_use]
    pub fn with_ledger(mut self, ledger: LedgerConfig) -> Self {
        self.ledger = ledger;
        self
    }

    /// Parse from TOML text; missing keys keep their defaults
    pub fn from_toml_str(text: &str) -> GiveResult<Self> {
        toml::from_str(text).map_err(|e| GiveError::Config(e.to_string()))
    }

    /// Load from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> GiveResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| GiveError::io_error(path, e))?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Apply environment overrides
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        match std::env::var_os(DATA_DIR_ENV) {
            Some(dir) if !dir.is_empty() => self.with_data_dir(dir),
            _ => self,
        }
    }
}

impl Default for GiveConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            assets_dir: PathBuf::from("assets/images"),
            default_image: "na.jpg".to_string(),
            min_donation: 5.0,
            featured_count: 3,
            log_filter: "info".to_string(),
            ledger: LedgerConfig::default(),
        }
    }
}

/// Mock ledger parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// First transaction number issued
    pub transaction_seed: u64,
    /// Base added to the timestamp suffix of fabricated accounts
    pub account_base: u64,
    /// Node reported by report verification
    pub consensus_node: String,
    /// Topic reported by report verification
    pub topic_id: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            transaction_seed: 9_000_000,
            account_base: 3_000_000,
            consensus_node: "0.0.3".to_string(),
            topic_id: "0.0.12345".to_string(),
        }
    }
}
