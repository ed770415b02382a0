//! Tower definition schema for JSON/TOML deserialization.
//!
//! These types mirror the on-disk definition format one to one. They are
//! deliberately loose (actions and operators are plain strings) so that
//! [`Tower::load`](super::Tower::load) can report malformed rules with their
//! location instead of failing inside serde.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Complete tower definition as written in a data file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TowerDef {
    /// Stable identifier
    pub name: String,
    /// Human-readable name, falls back to `name` when absent
    #[serde(default)]
    pub display_name: Option<String>,
    /// Base entities and upgrade paths
    pub upgrades: UpgradesDef,
}

/// Rule table section of a definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpgradesDef {
    /// Level-0 entities, all expected to be `new`
    #[serde(default)]
    pub base: Vec<ModificationDef>,
    /// `paths[path][tier]` is the ordered list of modifications for that tier
    pub paths: Vec<Vec<Vec<ModificationDef>>>,
}

/// One raw modification entry
///
/// Every key other than `name` and `action` is an attribute change. Both keys
/// may be absent here; validation reports them with their location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModificationDef {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(flatten)]
    pub attributes: BTreeMap<String, AttributeDef>,
}

/// Raw attribute value: a literal, a token such as `"invert"`, or `[op, operand]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeDef {
    Flag(bool),
    Number(f64),
    Token(String),
    Operator(String, f64),
    /// Anything else, rejected during validation
    Other(serde_json::Value),
}

impl TowerDef {
    /// Parse a definition from JSON
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Parse a definition from TOML
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}
