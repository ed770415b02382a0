//! Upgrade resolution.
//!
//! Resolution is a left fold over the rule table. Base entities are inserted
//! first, then tiers are applied round-robin by depth: every path's tier 0,
//! then every path's tier 1, and so on, skipping paths whose level is too low.
//! A later tier on one path may therefore buff an entity that another path
//! introduced at a shallower tier.

use rayon::prelude::*;
use std::collections::BTreeMap;

use super::error::{RangeError, ResolutionError, ResolutionErrorKind, RuleLocation, TowerError};
use super::levels::UpgradeLevels;
use super::modification::{AttributeChange, AttributeValue, EntitySpec, Modification, Op};
use super::resolved::ResolvedTower;
use super::template::Tower;

/// Working set of one resolution
type Entities = BTreeMap<String, EntitySpec>;

impl Tower {
    /// Check a level vector against this tower's paths
    pub fn check_levels(&self, levels: &[usize]) -> Result<(), RangeError> {
        if levels.len() != self.path_count() {
            return Err(RangeError::LevelCount {
                expected: self.path_count(),
                got: levels.len(),
            });
        }
        for (path, (&level, upgrade_path)) in levels.iter().zip(self.paths()).enumerate() {
            if level > upgrade_path.tier_count() {
                return Err(RangeError::Level {
                    path,
                    level,
                    max: upgrade_path.tier_count(),
                });
            }
        }
        Ok(())
    }

    /// Resolve the tower's entities at the given upgrade levels
    pub fn get_constructed_tower(&self, levels: &[usize]) -> Result<ResolvedTower, TowerError> {
        self.check_levels(levels)?;

        let levels = UpgradeLevels::from(levels);
        tracing::debug!(tower = %self.name(), levels = %levels, "resolving tower");

        let mut entities: Entities = self
            .base_entities()
            .iter()
            .map(|base| (base.name.clone(), base.spec.clone()))
            .collect();

        for tier in 0..levels.max_level() {
            for (path, upgrade_path) in self.paths().iter().enumerate() {
                if levels[path] <= tier {
                    continue;
                }
                let modifications = upgrade_path.tiers()[tier].modifications();
                for (index, modification) in modifications.iter().enumerate() {
                    let location = RuleLocation::Tier { path, tier, index };
                    apply_modification(&mut entities, modification, location)?;
                }
            }
        }

        Ok(ResolvedTower {
            tower: self.name().to_string(),
            levels,
            entities,
        })
    }

    /// Every valid level vector in lexicographic order
    pub fn all_levels(&self) -> Vec<UpgradeLevels> {
        let max = self.max_levels();
        let mut out = Vec::new();
        let mut current = vec![0; max.len()];
        loop {
            out.push(UpgradeLevels::new(current.clone()));
            // odometer increment, last path fastest
            let mut path = max.len();
            loop {
                if path == 0 {
                    return out;
                }
                path -= 1;
                if current[path] < max[path] {
                    current[path] += 1;
                    break;
                }
                current[path] = 0;
            }
        }
    }

    /// Resolve every valid level vector in parallel
    ///
    /// Results come back in the order of [`Tower::all_levels`]. Failures are
    /// kept per combination so one bad corner of the table doesn't hide the
    /// rest.
    pub fn resolve_all(&self) -> Vec<(UpgradeLevels, Result<ResolvedTower, TowerError>)> {
        self.all_levels()
            .into_par_iter()
            .map(|levels| {
                let result = self.get_constructed_tower(&levels);
                (levels, result)
            })
            .collect()
    }
}

fn apply_modification(
    entities: &mut Entities,
    modification: &Modification,
    location: RuleLocation,
) -> Result<(), ResolutionError> {
    tracing::trace!(%location, %modification, "applying modification");

    match modification {
        Modification::New { name, spec } => {
            if entities.contains_key(name) {
                return Err(ResolutionError {
                    entity: name.clone(),
                    location,
                    kind: ResolutionErrorKind::DuplicateNew,
                });
            }
            entities.insert(name.clone(), spec.clone());
        }
        Modification::Buff { name, changes } => {
            let spec = entities.get_mut(name).ok_or_else(|| ResolutionError {
                entity: name.clone(),
                location,
                kind: ResolutionErrorKind::MissingEntity,
            })?;
            for change in changes {
                apply_change(spec, change).map_err(|kind| ResolutionError {
                    entity: name.clone(),
                    location,
                    kind,
                })?;
            }
        }
    }
    Ok(())
}

fn apply_change(spec: &mut EntitySpec, change: &AttributeChange) -> Result<(), ResolutionErrorKind> {
    let attribute = &change.attribute;

    let next = match (change.op, spec.get(attribute).copied()) {
        (Op::Set(value), _) => value,
        (_, None) => return Err(ResolutionErrorKind::MissingAttribute(attribute.clone())),
        (Op::Invert, Some(AttributeValue::Flag(b))) => AttributeValue::Flag(!b),
        (Op::Invert, Some(AttributeValue::Number(_))) => {
            return Err(ResolutionErrorKind::TypeMismatch {
                attribute: attribute.clone(),
                expected: "boolean",
            });
        }
        (_, Some(AttributeValue::Flag(_))) => {
            return Err(ResolutionErrorKind::TypeMismatch {
                attribute: attribute.clone(),
                expected: "number",
            });
        }
        (Op::Add(x), Some(AttributeValue::Number(n))) => AttributeValue::Number(n + x),
        (Op::Sub(x), Some(AttributeValue::Number(n))) => AttributeValue::Number(n - x),
        (Op::Mul(x), Some(AttributeValue::Number(n))) => AttributeValue::Number(n * x),
        (Op::PercentReduce(x), Some(AttributeValue::Number(n))) => {
            AttributeValue::Number(n * (1.0 - x))
        }
    };
    spec.insert(attribute.clone(), next);
    Ok(())
}
