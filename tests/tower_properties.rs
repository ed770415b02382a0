//! Property tests for tower resolution.

use popology::core::config::ResolverConfig;
use popology::tower::*;
use proptest::prelude::*;

const SAMPLE_TOWER: &str = include_str!("../data/towers/sample_tower.json");

fn sample_tower() -> Tower {
    let def = TowerDef::from_json_str(SAMPLE_TOWER).unwrap();
    Tower::load_with(&def, &ResolverConfig::default()).unwrap()
}

/// One path whose every tier adds to `dart.damage`
fn additive_tower(operands: &[f64]) -> Tower {
    let tiers: Vec<String> = operands
        .iter()
        .map(|x| format!(r#"[{{"name": "dart", "action": "buff", "damage": ["+", {}]}}]"#, x))
        .collect();
    let json = format!(
        r#"{{"name": "adder", "upgrades": {{
            "base": [{{"name": "dart", "action": "new", "damage": 1}}],
            "paths": [[{}]]
        }}}}"#,
        tiers.join(", ")
    );
    let def = TowerDef::from_json_str(&json).unwrap();
    Tower::load_with(&def, &ResolverConfig::unrestricted()).unwrap()
}

fn sample_levels() -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(0usize..=5, 3)
}

proptest! {
    #[test]
    fn resolution_is_deterministic(levels in sample_levels()) {
        let tower = sample_tower();
        let first = tower.get_constructed_tower(&levels).unwrap();
        let second = tower.get_constructed_tower(&levels).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn additive_path_is_strictly_increasing(
        operands in prop::collection::vec(0.01f64..100.0, 1..8)
    ) {
        let tower = additive_tower(&operands);
        let mut previous = f64::NEG_INFINITY;
        for level in 0..=operands.len() {
            let damage = tower
                .get_constructed_tower(&[level])
                .unwrap()
                .number("dart", "damage")
                .unwrap();
            prop_assert!(damage > previous);
            previous = damage;
        }
    }

    #[test]
    fn base_survives_any_resolution_sequence(
        sequence in prop::collection::vec(sample_levels(), 1..10)
    ) {
        let tower = sample_tower();
        let base = tower.get_constructed_tower(&[0, 0, 0]).unwrap();
        for levels in &sequence {
            tower.get_constructed_tower(levels).unwrap();
        }
        prop_assert_eq!(tower.get_constructed_tower(&[0, 0, 0]).unwrap(), base);
    }

    #[test]
    fn levels_past_the_path_are_rejected(extra in 1usize..10, path in 0usize..3) {
        let tower = sample_tower();
        let mut levels = vec![0; 3];
        levels[path] = 5 + extra;
        let err = tower.get_constructed_tower(&levels).unwrap_err();
        prop_assert!(matches!(err, TowerError::Range(RangeError::Level { .. })), "unexpected error: {:?}", err);
    }
}
