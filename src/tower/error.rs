//! Error taxonomy for loading and resolving towers.

use std::fmt;

use thiserror::Error;

/// Position of a single modification inside a tower's rule table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleLocation {
    /// Entry in the level-0 base list
    Base { index: usize },
    /// Entry inside `paths[path].tiers[tier]`
    Tier {
        path: usize,
        tier: usize,
        index: usize,
    },
}

impl fmt::Display for RuleLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleLocation::Base { index } => write!(f, "base[{}]", index),
            RuleLocation::Tier { path, tier, index } => {
                write!(f, "path {} tier {} [{}]", path, tier, index)
            }
        }
    }
}

/// Malformed rule table, raised while loading a tower
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("tower has no upgrade paths")]
    NoPaths,

    #[error("expected {expected} upgrade paths, found {found}")]
    PathCount { expected: usize, found: usize },

    #[error("path {path} has no tiers")]
    EmptyPath { path: usize },

    #[error("path {path} has {tiers} tiers, at most {max} allowed")]
    TooManyTiers { path: usize, tiers: usize, max: usize },

    #[error("{location}: modification has an empty entity name")]
    EmptyName { location: RuleLocation },

    #[error("{location}: modification on '{name}' has no action")]
    MissingAction { location: RuleLocation, name: String },

    #[error("{location}: modification on '{name}' has an empty attribute name")]
    EmptyAttribute { location: RuleLocation, name: String },

    #[error("{location}: unknown action '{action}' on '{name}'")]
    UnknownAction {
        location: RuleLocation,
        name: String,
        action: String,
    },

    #[error("{location}: unknown operator '{op}' on {name}.{attribute}")]
    UnknownOperator {
        location: RuleLocation,
        name: String,
        attribute: String,
        op: String,
    },

    #[error("{location}: invalid operand {operand} for '{op}' on {name}.{attribute}")]
    InvalidOperand {
        location: RuleLocation,
        name: String,
        attribute: String,
        op: String,
        operand: f64,
    },

    #[error("{location}: unsupported value '{value}' for {name}.{attribute}")]
    UnsupportedValue {
        location: RuleLocation,
        name: String,
        attribute: String,
        value: String,
    },

    #[error("{location}: 'new' on '{name}' must use literal values, got an operator for '{attribute}'")]
    OperatorInNew {
        location: RuleLocation,
        name: String,
        attribute: String,
    },

    #[error("{location}: base entries must use 'new', '{name}' does not")]
    BaseNotNew { location: RuleLocation, name: String },

    #[error("{location}: '{name}' is already defined at {first}")]
    DuplicateEntity {
        location: RuleLocation,
        first: RuleLocation,
        name: String,
    },
}

/// Caller-supplied level vector or lookup coordinate outside the table
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    #[error("expected {expected} upgrade levels, got {got}")]
    LevelCount { expected: usize, got: usize },

    #[error("level {level} on path {path} is out of range [0, {max}]")]
    Level { path: usize, level: usize, max: usize },

    #[error("path {path} is out of range (tower has {path_count} paths)")]
    Path { path: usize, path_count: usize },

    #[error("tier {tier} on path {path} is out of range (path has {tier_count} tiers)")]
    Tier {
        path: usize,
        tier: usize,
        tier_count: usize,
    },
}

/// What went wrong when a modification met the working set
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionErrorKind {
    /// `new` for a name that is already present
    DuplicateNew,
    /// `buff` for a name that is not present
    MissingEntity,
    /// Arithmetic or invert on an attribute the entity lacks
    MissingAttribute(String),
    /// Arithmetic on a boolean, or invert on a number
    TypeMismatch { attribute: String, expected: &'static str },
}

impl fmt::Display for ResolutionErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolutionErrorKind::DuplicateNew => write!(f, "entity is already defined"),
            ResolutionErrorKind::MissingEntity => write!(f, "entity does not exist yet"),
            ResolutionErrorKind::MissingAttribute(attribute) => {
                write!(f, "attribute '{}' does not exist", attribute)
            }
            ResolutionErrorKind::TypeMismatch {
                attribute,
                expected,
            } => write!(f, "attribute '{}' is not a {}", attribute, expected),
        }
    }
}

/// Rule table inconsistent for one particular level vector
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{location}: cannot apply to '{entity}': {kind}")]
pub struct ResolutionError {
    pub entity: String,
    pub location: RuleLocation,
    pub kind: ResolutionErrorKind,
}

/// Any failure surfaced by the tower API
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TowerError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("range error: {0}")]
    Range(#[from] RangeError),

    #[error("resolution error: {0}")]
    Resolution(#[from] ResolutionError),
}
