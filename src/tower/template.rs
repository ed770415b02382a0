//! Validated tower templates and read-only rule lookups.

use std::collections::HashMap;
use std::fmt;

use crate::core::config::{self, ResolverConfig};

use super::error::{RangeError, RuleLocation, ValidationError};
use super::modification::{EntitySpec, Modification};
use super::schema::TowerDef;

/// An entity present before any upgrade is bought
#[derive(Debug, Clone, PartialEq)]
pub struct BaseEntity {
    pub name: String,
    pub spec: EntitySpec,
}

/// One upgrade level of a path
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Tier {
    modifications: Vec<Modification>,
}

impl Tier {
    pub fn new(modifications: Vec<Modification>) -> Self {
        Self { modifications }
    }

    /// Modifications in application order
    pub fn modifications(&self) -> &[Modification] {
        &self.modifications
    }

    pub fn is_empty(&self) -> bool {
        self.modifications.is_empty()
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifications.is_empty() {
            return write!(f, "(no changes)");
        }
        let parts: Vec<String> = self.modifications.iter().map(|m| m.to_string()).collect();
        write!(f, "{}", parts.join("; "))
    }
}

/// An independent upgrade track
#[derive(Debug, Clone, PartialEq)]
pub struct UpgradePath {
    tiers: Vec<Tier>,
}

impl UpgradePath {
    pub fn tiers(&self) -> &[Tier] {
        &self.tiers
    }

    /// Highest level this path can be bought to
    pub fn tier_count(&self) -> usize {
        self.tiers.len()
    }
}

/// A validated tower definition
///
/// Built once by [`Tower::load`] and never mutated afterwards, so a single
/// instance can back any number of concurrent resolutions.
#[derive(Debug, Clone, PartialEq)]
pub struct Tower {
    name: String,
    display_name: String,
    base: Vec<BaseEntity>,
    paths: Vec<UpgradePath>,
}

impl Tower {
    /// Validate a definition against the global resolver config
    pub fn load(def: &TowerDef) -> Result<Self, ValidationError> {
        Self::load_with(def, config::config())
    }

    /// Validate a definition against an explicit config
    pub fn load_with(def: &TowerDef, config: &ResolverConfig) -> Result<Self, ValidationError> {
        let raw_paths = &def.upgrades.paths;

        if raw_paths.is_empty() {
            return Err(ValidationError::NoPaths);
        }
        if let Some(expected) = config.path_count {
            if raw_paths.len() != expected {
                return Err(ValidationError::PathCount {
                    expected,
                    found: raw_paths.len(),
                });
            }
        }
        for (path, tiers) in raw_paths.iter().enumerate() {
            if tiers.is_empty() {
                return Err(ValidationError::EmptyPath { path });
            }
            if tiers.len() > config.max_tiers_per_path {
                return Err(ValidationError::TooManyTiers {
                    path,
                    tiers: tiers.len(),
                    max: config.max_tiers_per_path,
                });
            }
        }

        let mut base = Vec::with_capacity(def.upgrades.base.len());
        let mut seen: HashMap<String, RuleLocation> = HashMap::new();
        for (index, raw) in def.upgrades.base.iter().enumerate() {
            let location = RuleLocation::Base { index };
            match Modification::from_def(raw, location)? {
                Modification::New { name, spec } => {
                    if let Some(first) = seen.insert(name.clone(), location) {
                        return Err(ValidationError::DuplicateEntity {
                            location,
                            first,
                            name,
                        });
                    }
                    base.push(BaseEntity { name, spec });
                }
                Modification::Buff { name, .. } => {
                    return Err(ValidationError::BaseNotNew { location, name });
                }
            }
        }

        let mut paths = Vec::with_capacity(raw_paths.len());
        for (path, raw_tiers) in raw_paths.iter().enumerate() {
            let mut tiers = Vec::with_capacity(raw_tiers.len());
            for (tier, raw_mods) in raw_tiers.iter().enumerate() {
                let mut introduced: HashMap<&str, RuleLocation> = HashMap::new();
                let mut modifications = Vec::with_capacity(raw_mods.len());
                for (index, raw) in raw_mods.iter().enumerate() {
                    let location = RuleLocation::Tier { path, tier, index };
                    let modification = Modification::from_def(raw, location)?;
                    if let Modification::New { .. } = modification {
                        if let Some(first) = introduced.insert(raw.name.as_str(), location) {
                            return Err(ValidationError::DuplicateEntity {
                                location,
                                first,
                                name: raw.name.clone(),
                            });
                        }
                    }
                    modifications.push(modification);
                }
                tiers.push(Tier::new(modifications));
            }
            paths.push(UpgradePath { tiers });
        }

        let display_name = def
            .display_name
            .clone()
            .unwrap_or_else(|| def.name.clone());

        tracing::debug!(
            tower = %def.name,
            base = base.len(),
            paths = paths.len(),
            "loaded tower definition"
        );

        Ok(Self {
            name: def.name.clone(),
            display_name,
            base,
            paths,
        })
    }

    /// Stable identifier
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Entities present at level 0, in definition order
    pub fn base_entities(&self) -> &[BaseEntity] {
        &self.base
    }

    pub fn paths(&self) -> &[UpgradePath] {
        &self.paths
    }

    pub fn path_count(&self) -> usize {
        self.paths.len()
    }

    /// Tier count of every path, i.e. the highest valid level vector
    pub fn max_levels(&self) -> Vec<usize> {
        self.paths.iter().map(UpgradePath::tier_count).collect()
    }

    /// Whole upgrade path, for path summaries
    pub fn path(&self, path: usize) -> Result<&UpgradePath, RangeError> {
        self.paths.get(path).ok_or(RangeError::Path {
            path,
            path_count: self.paths.len(),
        })
    }

    /// Raw rules of a single tier; nothing is applied
    ///
    /// `tier` is zero-based, so tier 0 is what level 1 unlocks.
    pub fn tier(&self, path: usize, tier: usize) -> Result<&Tier, RangeError> {
        let upgrade_path = self.path(path)?;
        upgrade_path.tiers.get(tier).ok_or(RangeError::Tier {
            path,
            tier,
            tier_count: upgrade_path.tier_count(),
        })
    }
}
