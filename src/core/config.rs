//! Resolver configuration
//!
//! Structural limits a tower definition must respect before it is accepted.
//! Values can come from a `popology.toml` file; anything left out falls back
//! to the defaults below. In the file, `0` for either limit means "no limit".

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

use crate::core::error::{PopologyError, Result};

/// Shape limits checked by `Tower::load`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Required number of upgrade paths per tower
    ///
    /// `None` accepts any non-zero count. The stock towers all have three.
    /// Written as `path_count = 0` in a config file.
    pub path_count: Option<usize>,

    /// Maximum number of tiers a single path may define
    ///
    /// `max_tiers_per_path = 0` in a config file lifts the limit.
    pub max_tiers_per_path: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            path_count: Some(3),
            max_tiers_per_path: 5,
        }
    }
}

impl ResolverConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Config that accepts any number of paths and tiers
    pub fn unrestricted() -> Self {
        Self {
            path_count: None,
            max_tiers_per_path: usize::MAX,
        }
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.path_count == Some(0) {
            return Err("path_count must be at least 1".into());
        }
        if self.max_tiers_per_path == 0 {
            return Err("max_tiers_per_path must be at least 1".into());
        }
        Ok(())
    }

    /// Parse and validate a config from TOML
    ///
    /// A zero limit in the file is read as "no limit".
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let mut config: ResolverConfig = toml::from_str(content)?;
        if config.path_count == Some(0) {
            config.path_count = None;
        }
        if config.max_tiers_per_path == 0 {
            config.max_tiers_per_path = usize::MAX;
        }
        config.validate().map_err(PopologyError::Config)?;
        Ok(config)
    }

    /// Load and validate a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}

// === GLOBAL CONFIG ACCESS ===

static CONFIG: OnceLock<ResolverConfig> = OnceLock::new();

/// Get the global resolver config (initializes with defaults if not set)
pub fn config() -> &'static ResolverConfig {
    CONFIG.get_or_init(ResolverConfig::default)
}

/// Set the global resolver config (can only be called once)
///
/// Returns Err if config was already set.
pub fn set_config(config: ResolverConfig) -> std::result::Result<(), ResolverConfig> {
    CONFIG.set(config)
}
