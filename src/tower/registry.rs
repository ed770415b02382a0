//! Tower registry for loading tower definitions from disk.
//!
//! This module provides the `TowerRegistry` which validates definitions into
//! [`Tower`]s and indexes them by name. Definitions can be JSON (the native
//! format) or TOML.

use std::collections::BTreeMap;
use std::path::Path;

use crate::core::config::{self, ResolverConfig};
use crate::core::error::{PopologyError, Result};

use super::schema::TowerDef;
use super::template::Tower;

/// Definition file encodings the registry understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinitionFormat {
    Json,
    Toml,
}

impl DefinitionFormat {
    /// Pick a format from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "json" => Some(DefinitionFormat::Json),
            "toml" => Some(DefinitionFormat::Toml),
            _ => None,
        }
    }
}

/// Registry of validated towers, keyed by tower name
#[derive(Debug)]
pub struct TowerRegistry {
    towers: BTreeMap<String, Tower>,
    config: ResolverConfig,
}

impl Default for TowerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TowerRegistry {
    /// Create an empty registry using the global resolver config
    pub fn new() -> Self {
        Self::with_config(config::config().clone())
    }

    pub fn with_config(config: ResolverConfig) -> Self {
        Self {
            towers: BTreeMap::new(),
            config,
        }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Add an already validated tower
    pub fn register(&mut self, tower: Tower) -> Result<()> {
        if self.towers.contains_key(tower.name()) {
            return Err(PopologyError::DuplicateTower(tower.name().to_string()));
        }
        tracing::debug!(tower = %tower.name(), "registered tower");
        self.towers.insert(tower.name().to_string(), tower);
        Ok(())
    }

    /// Validate and add a parsed definition, returning the tower name
    pub fn register_def(&mut self, def: &TowerDef) -> Result<String> {
        let tower = Tower::load_with(def, &self.config)?;
        let name = tower.name().to_string();
        self.register(tower)?;
        Ok(name)
    }

    /// Load a definition from a string in the given format
    pub fn load_str(&mut self, content: &str, format: DefinitionFormat) -> Result<String> {
        let def = match format {
            DefinitionFormat::Json => TowerDef::from_json_str(content)?,
            DefinitionFormat::Toml => TowerDef::from_toml_str(content)?,
        };
        self.register_def(&def)
    }

    /// Load a definition file, choosing the format by extension
    pub fn load_file(&mut self, path: &Path) -> Result<String> {
        let format = DefinitionFormat::from_path(path)
            .ok_or_else(|| PopologyError::UnsupportedFile(path.display().to_string()))?;
        let content = std::fs::read_to_string(path).map_err(|e| PopologyError::from(e).in_file(path))?;
        self.load_str(&content, format).map_err(|e| e.in_file(path))
    }

    /// Load all .json and .toml files from a directory recursively
    pub fn load_directory(&mut self, path: &Path) -> Result<Vec<String>> {
        let mut names = Vec::new();
        self.load_directory_recursive(path, &mut names)?;
        tracing::info!(
            directory = %path.display(),
            loaded = names.len(),
            "loaded tower definitions"
        );
        Ok(names)
    }

    fn load_directory_recursive(&mut self, path: &Path, names: &mut Vec<String>) -> Result<()> {
        let mut entries = std::fs::read_dir(path)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<std::io::Result<Vec<_>>>()?;
        entries.sort();

        for entry_path in entries {
            if entry_path.is_dir() {
                self.load_directory_recursive(&entry_path, names)?;
            } else if DefinitionFormat::from_path(&entry_path).is_some() {
                names.push(self.load_file(&entry_path)?);
            } else {
                tracing::warn!(file = %entry_path.display(), "skipping non-definition file");
            }
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Tower> {
        self.towers.get(name)
    }

    /// Get a tower by name, failing with `TowerNotFound`
    pub fn require(&self, name: &str) -> Result<&Tower> {
        self.get(name)
            .ok_or_else(|| PopologyError::TowerNotFound(name.to_string()))
    }

    /// Tower names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.towers.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tower> {
        self.towers.values()
    }

    pub fn len(&self) -> usize {
        self.towers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.towers.is_empty()
    }
}
