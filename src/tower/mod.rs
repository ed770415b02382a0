//! Tower upgrade resolution
//!
//! A tower is a set of base entities (projectiles, mostly) plus a grid of
//! modification rules organized into parallel upgrade paths and tiers.
//! Resolving a tower at an upgrade-level vector folds the reachable rules over
//! the base entities and yields the final attribute set of every entity.

pub mod error;
pub mod levels;
pub mod modification;
pub mod registry;
pub mod resolved;
pub mod resolver;
pub mod schema;
pub mod template;

pub use error::{
    RangeError, ResolutionError, ResolutionErrorKind, RuleLocation, TowerError, ValidationError,
};
pub use levels::{ParseLevelsError, UpgradeLevels};
pub use modification::{AttributeChange, AttributeValue, EntitySpec, Modification, Op};
pub use registry::{DefinitionFormat, TowerRegistry};
pub use resolved::ResolvedTower;
pub use schema::{AttributeDef, ModificationDef, TowerDef, UpgradesDef};
pub use template::{BaseEntity, Tier, Tower, UpgradePath};
