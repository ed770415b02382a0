//! Fully resolved towers.
//!
//! A [`ResolvedTower`] owns every value it holds. It never points back into
//! the rule table, so callers can keep, mutate or serialize it freely.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::levels::UpgradeLevels;
use super::modification::{AttributeValue, EntitySpec};

/// Final entity set of a tower at one level vector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedTower {
    pub tower: String,
    pub levels: UpgradeLevels,
    pub entities: BTreeMap<String, EntitySpec>,
}

impl ResolvedTower {
    pub fn entity(&self, name: &str) -> Option<&EntitySpec> {
        self.entities.get(name)
    }

    pub fn attribute(&self, entity: &str, attribute: &str) -> Option<AttributeValue> {
        self.entities.get(entity)?.get(attribute).copied()
    }

    /// Numeric attribute, `None` if missing or boolean
    pub fn number(&self, entity: &str, attribute: &str) -> Option<f64> {
        self.attribute(entity, attribute)?.as_number()
    }

    /// Boolean attribute, `None` if missing or numeric
    pub fn flag(&self, entity: &str, attribute: &str) -> Option<bool> {
        self.attribute(entity, attribute)?.as_flag()
    }

    /// Entity names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entities.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Serialize as the JSON payload handed to the simulator
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for ResolvedTower {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} [{}]", self.tower, self.levels)?;
        for (name, spec) in &self.entities {
            let attrs: Vec<String> = spec
                .iter()
                .map(|(attr, value)| format!("{}={}", attr, value))
                .collect();
            writeln!(f, "  {}: {}", name, attrs.join(", "))?;
        }
        Ok(())
    }
}
