//! Validated modification rules.
//!
//! A raw [`ModificationDef`] becomes a [`Modification`] once its action and
//! every attribute change have been checked. After that point a rule can only
//! fail against a particular working set, never because of its own shape.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::error::{RuleLocation, ValidationError};
use super::schema::{AttributeDef, ModificationDef};

/// Literal token that flips a boolean attribute
pub const INVERT_TOKEN: &str = "invert";

/// A single resolved attribute value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Flag(bool),
    Number(f64),
}

impl AttributeValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            AttributeValue::Number(n) => Some(*n),
            AttributeValue::Flag(_) => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            AttributeValue::Flag(b) => Some(*b),
            AttributeValue::Number(_) => None,
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Flag(b) => write!(f, "{}", b),
            AttributeValue::Number(n) => write!(f, "{}", n),
        }
    }
}

/// Attribute name -> value for one entity
pub type EntitySpec = BTreeMap<String, AttributeValue>;

/// How a `buff` changes one attribute
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Op {
    /// Replace with a literal value
    Set(AttributeValue),
    Add(f64),
    Sub(f64),
    Mul(f64),
    /// Multiply by `1 - operand`
    PercentReduce(f64),
    /// Flip a boolean
    Invert,
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Op::Set(value) => write!(f, "= {}", value),
            Op::Add(n) => write!(f, "+{}", n),
            Op::Sub(n) => write!(f, "-{}", n),
            Op::Mul(n) => write!(f, "*{}", n),
            Op::PercentReduce(n) => write!(f, "%{}", n),
            Op::Invert => write!(f, "invert"),
        }
    }
}

/// One attribute change inside a `buff`
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeChange {
    pub attribute: String,
    pub op: Op,
}

impl fmt::Display for AttributeChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.op {
            Op::Invert => write!(f, "invert {}", self.attribute),
            op => write!(f, "{} {}", self.attribute, op),
        }
    }
}

/// A validated rule
#[derive(Debug, Clone, PartialEq)]
pub enum Modification {
    /// Introduce a new entity with a full attribute set
    New { name: String, spec: EntitySpec },
    /// Change attributes of an existing entity, in order
    Buff {
        name: String,
        changes: Vec<AttributeChange>,
    },
}

impl Modification {
    /// Name of the entity this rule targets or introduces
    pub fn name(&self) -> &str {
        match self {
            Modification::New { name, .. } | Modification::Buff { name, .. } => name,
        }
    }

    /// Validate a raw definition entry
    pub fn from_def(
        def: &ModificationDef,
        location: RuleLocation,
    ) -> Result<Self, ValidationError> {
        if def.name.trim().is_empty() {
            return Err(ValidationError::EmptyName { location });
        }

        let action = def.action.as_deref().ok_or_else(|| ValidationError::MissingAction {
            location,
            name: def.name.clone(),
        })?;

        match action {
            "new" => {
                let mut spec = EntitySpec::new();
                for (attribute, raw) in &def.attributes {
                    check_attribute_name(def, attribute, location)?;
                    let value = match raw {
                        AttributeDef::Flag(b) => AttributeValue::Flag(*b),
                        AttributeDef::Number(n) => {
                            if !n.is_finite() {
                                return Err(unsupported(def, attribute, location, n));
                            }
                            AttributeValue::Number(*n)
                        }
                        AttributeDef::Token(token) if token == INVERT_TOKEN => {
                            return Err(ValidationError::OperatorInNew {
                                location,
                                name: def.name.clone(),
                                attribute: attribute.clone(),
                            });
                        }
                        AttributeDef::Token(token) => {
                            return Err(unsupported(def, attribute, location, token));
                        }
                        AttributeDef::Operator(..) => {
                            return Err(ValidationError::OperatorInNew {
                                location,
                                name: def.name.clone(),
                                attribute: attribute.clone(),
                            });
                        }
                        AttributeDef::Other(value) => {
                            return Err(unsupported(def, attribute, location, value));
                        }
                    };
                    spec.insert(attribute.clone(), value);
                }
                Ok(Modification::New {
                    name: def.name.clone(),
                    spec,
                })
            }
            "buff" => {
                let changes = def
                    .attributes
                    .iter()
                    .map(|(attribute, raw)| {
                        check_attribute_name(def, attribute, location)?;
                        Ok(AttributeChange {
                            attribute: attribute.clone(),
                            op: parse_op(def, attribute, raw, location)?,
                        })
                    })
                    .collect::<Result<Vec<_>, ValidationError>>()?;
                Ok(Modification::Buff {
                    name: def.name.clone(),
                    changes,
                })
            }
            other => Err(ValidationError::UnknownAction {
                location,
                name: def.name.clone(),
                action: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for Modification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Modification::New { name, spec } => {
                write!(f, "new {}", name)?;
                let attrs: Vec<String> = spec
                    .iter()
                    .map(|(attr, value)| format!("{}={}", attr, value))
                    .collect();
                if !attrs.is_empty() {
                    write!(f, " ({})", attrs.join(", "))?;
                }
                Ok(())
            }
            Modification::Buff { name, changes } => {
                let parts: Vec<String> = changes.iter().map(|c| c.to_string()).collect();
                write!(f, "{}: {}", name, parts.join(", "))
            }
        }
    }
}

fn check_attribute_name(
    def: &ModificationDef,
    attribute: &str,
    location: RuleLocation,
) -> Result<(), ValidationError> {
    if attribute.trim().is_empty() {
        return Err(ValidationError::EmptyAttribute {
            location,
            name: def.name.clone(),
        });
    }
    Ok(())
}

fn unsupported(
    def: &ModificationDef,
    attribute: &str,
    location: RuleLocation,
    value: impl fmt::Display,
) -> ValidationError {
    ValidationError::UnsupportedValue {
        location,
        name: def.name.clone(),
        attribute: attribute.to_string(),
        value: value.to_string(),
    }
}

fn parse_op(
    def: &ModificationDef,
    attribute: &str,
    raw: &AttributeDef,
    location: RuleLocation,
) -> Result<Op, ValidationError> {
    match raw {
        AttributeDef::Flag(b) => Ok(Op::Set(AttributeValue::Flag(*b))),
        AttributeDef::Number(n) if n.is_finite() => Ok(Op::Set(AttributeValue::Number(*n))),
        AttributeDef::Number(n) => Err(unsupported(def, attribute, location, n)),
        AttributeDef::Token(token) if token == INVERT_TOKEN => Ok(Op::Invert),
        AttributeDef::Token(token) => Err(unsupported(def, attribute, location, token)),
        AttributeDef::Other(value) => Err(unsupported(def, attribute, location, value)),
        AttributeDef::Operator(op, operand) => {
            let invalid = || ValidationError::InvalidOperand {
                location,
                name: def.name.clone(),
                attribute: attribute.to_string(),
                op: op.clone(),
                operand: *operand,
            };
            if !operand.is_finite() {
                return Err(invalid());
            }
            match op.as_str() {
                "+" => Ok(Op::Add(*operand)),
                "-" => Ok(Op::Sub(*operand)),
                "*" => Ok(Op::Mul(*operand)),
                "%" if (0.0..=1.0).contains(operand) => Ok(Op::PercentReduce(*operand)),
                "%" => Err(invalid()),
                _ => Err(ValidationError::UnknownOperator {
                    location,
                    name: def.name.clone(),
                    attribute: attribute.to_string(),
                    op: op.clone(),
                }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOC: RuleLocation = RuleLocation::Tier {
        path: 0,
        tier: 1,
        index: 0,
    };

    fn def(name: &str, action: &str, attrs: &[(&str, AttributeDef)]) -> ModificationDef {
        ModificationDef {
            name: name.to_string(),
            action: Some(action.to_string()),
            attributes: attrs
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        }
    }

    fn op(symbol: &str, operand: f64) -> AttributeDef {
        AttributeDef::Operator(symbol.to_string(), operand)
    }

    #[test]
    fn test_new_collects_literals() {
        let raw = def(
            "bullet",
            "new",
            &[
                ("damage", AttributeDef::Number(3.0)),
                ("impact", AttributeDef::Flag(true)),
            ],
        );
        match Modification::from_def(&raw, LOC).unwrap() {
            Modification::New { name, spec } => {
                assert_eq!(name, "bullet");
                assert_eq!(spec["damage"], AttributeValue::Number(3.0));
                assert_eq!(spec["impact"], AttributeValue::Flag(true));
            }
            other => panic!("Expected New, got {:?}", other),
        }
    }

    #[test]
    fn test_buff_parses_every_operator() {
        let raw = def(
            "dart",
            "buff",
            &[
                ("a", op("+", 1.0)),
                ("b", op("-", 2.0)),
                ("c", op("*", 0.5)),
                ("d", op("%", 0.25)),
                ("e", AttributeDef::Token("invert".to_string())),
                ("f", AttributeDef::Flag(false)),
            ],
        );
        let Modification::Buff { changes, .. } = Modification::from_def(&raw, LOC).unwrap() else {
            panic!("Expected Buff");
        };
        let ops: Vec<Op> = changes.iter().map(|c| c.op).collect();
        assert_eq!(
            ops,
            vec![
                Op::Add(1.0),
                Op::Sub(2.0),
                Op::Mul(0.5),
                Op::PercentReduce(0.25),
                Op::Invert,
                Op::Set(AttributeValue::Flag(false)),
            ]
        );
    }

    #[test]
    fn test_unknown_operator_rejected() {
        let raw = def("dart", "buff", &[("damage", op("^", 2.0))]);
        let err = Modification::from_def(&raw, LOC).unwrap_err();
        assert!(matches!(err, ValidationError::UnknownOperator { ref op, .. } if op == "^"));
    }

    #[test]
    fn test_percent_outside_unit_range_rejected() {
        for operand in [-0.1, 1.5] {
            let raw = def("dart", "buff", &[("damage", op("%", operand))]);
            let err = Modification::from_def(&raw, LOC).unwrap_err();
            assert!(matches!(err, ValidationError::InvalidOperand { .. }));
        }
    }

    #[test]
    fn test_unknown_action_rejected() {
        let raw = def("dart", "nerf", &[]);
        let err = Modification::from_def(&raw, LOC).unwrap_err();
        assert!(matches!(err, ValidationError::UnknownAction { ref action, .. } if action == "nerf"));
    }

    #[test]
    fn test_new_with_operator_rejected() {
        let raw = def("dart", "new", &[("damage", op("+", 1.0))]);
        let err = Modification::from_def(&raw, LOC).unwrap_err();
        assert!(matches!(err, ValidationError::OperatorInNew { .. }));
    }

    #[test]
    fn test_stray_token_rejected() {
        let raw = def("dart", "buff", &[("impact", AttributeDef::Token("flip".to_string()))]);
        let err = Modification::from_def(&raw, LOC).unwrap_err();
        assert!(matches!(err, ValidationError::UnsupportedValue { .. }));
    }

    #[test]
    fn test_empty_name_rejected() {
        let raw = def("  ", "buff", &[]);
        let err = Modification::from_def(&raw, LOC).unwrap_err();
        assert_eq!(err, ValidationError::EmptyName { location: LOC });
    }

    #[test]
    fn test_missing_action_rejected() {
        let raw: ModificationDef =
            serde_json::from_str(r#"{"name": "dart", "damage": ["+", 1]}"#).unwrap();
        let err = Modification::from_def(&raw, LOC).unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingAction {
                location: LOC,
                name: "dart".to_string()
            }
        );
    }

    #[test]
    fn test_missing_name_rejected() {
        let raw: ModificationDef = serde_json::from_str(r#"{"action": "buff"}"#).unwrap();
        let err = Modification::from_def(&raw, LOC).unwrap_err();
        assert_eq!(err, ValidationError::EmptyName { location: LOC });
    }

    #[test]
    fn test_malformed_operator_pairs_rejected() {
        for (json, shown) in [
            (r#"{"name": "dart", "action": "buff", "damage": ["+"]}"#, r#"["+"]"#),
            (r#"{"name": "dart", "action": "buff", "damage": [5, 1]}"#, "[5,1]"),
            (r#"{"name": "dart", "action": "new", "damage": {"x": 1}}"#, r#"{"x":1}"#),
        ] {
            let raw: ModificationDef = serde_json::from_str(json).unwrap();
            let err = Modification::from_def(&raw, LOC).unwrap_err();
            assert_eq!(
                err,
                ValidationError::UnsupportedValue {
                    location: LOC,
                    name: "dart".to_string(),
                    attribute: "damage".to_string(),
                    value: shown.to_string(),
                }
            );
        }
    }

    #[test]
    fn test_non_finite_operand_from_toml_rejected() {
        for literal in ["inf", "-inf", "nan"] {
            let toml_str = format!(
                r#"
name = "dartTower"

[upgrades]
paths = [[[{{ name = "dart", action = "buff", damage = ["+", {}] }}]]]
"#,
                literal
            );
            let def = crate::tower::schema::TowerDef::from_toml_str(&toml_str).unwrap();
            let raw = &def.upgrades.paths[0][0][0];
            let err = Modification::from_def(raw, LOC).unwrap_err();
            assert!(
                matches!(err, ValidationError::InvalidOperand { ref op, .. } if op == "+"),
                "{} accepted: {:?}",
                literal,
                err
            );
        }
    }

    #[test]
    fn test_empty_attribute_name_rejected() {
        let raw = def("dart", "buff", &[(" ", op("+", 1.0))]);
        let err = Modification::from_def(&raw, LOC).unwrap_err();
        assert_eq!(
            err,
            ValidationError::EmptyAttribute {
                location: LOC,
                name: "dart".to_string()
            }
        );
    }

    #[test]
    fn test_display() {
        let raw = def(
            "dart",
            "buff",
            &[("attackCooldown", op("*", 0.5)), ("damage", op("+", 2.0))],
        );
        let modification = Modification::from_def(&raw, LOC).unwrap();
        assert_eq!(modification.to_string(), "dart: attackCooldown *0.5, damage +2");
    }
}
