//! Property-based tests: validators never panic, `validate` agrees with
//! `parse`, parsing is idempotent and JSON round trips keep behavior.

use proptest::prelude::*;
use serde_json::Value;
use vschema::prelude::*;

// -----------------------------------------------------------------------
// Helpers: arbitrary JSON value generators
// -----------------------------------------------------------------------

fn arb_json_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<f64>()
            .prop_filter("finite", |f| f.is_finite())
            .prop_map(|f| serde_json::json!(f)),
        any::<i64>().prop_map(|i| serde_json::json!(i)),
        (-200i64..200).prop_map(|i| serde_json::json!(i)),
        ".*".prop_map(Value::String),
        "[a-zA-Z@.]{0,12}".prop_map(Value::String),
    ];
    leaf.prop_recursive(
        3,  // max depth
        64, // max nodes
        8,  // items per collection
        |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..8).prop_map(Value::Array),
                prop::collection::vec(("[a-c]{1,2}", inner), 0..6)
                    .prop_map(|pairs| Value::Object(pairs.into_iter().collect())),
            ]
        },
    )
}

/// A fixed set of trees covering every validator kind and most rules.
fn trees() -> Vec<ZSchema> {
    vec![
        vschema::any().into(),
        vschema::any().required().into(),
        vschema::boolean().equals(false).into(),
        vschema::number().into(),
        vschema::number().integer().min(-100.0).max(100.0).into(),
        vschema::number().required().default(0.0).max(10.5).into(),
        vschema::string().into(),
        vschema::string().uppercase().min(1).into(),
        vschema::string().lowercase().max(5).contains("a").into(),
        vschema::string()
            .try_matches("/^[a-z]+@[a-z]+\\.[a-z]+$/i")
            .unwrap()
            .into(),
        vschema::array().into(),
        vschema::array()
            .max(4)
            .item(vschema::number().required().integer())
            .into(),
        vschema::array().item(vschema::string().default("?")).into(),
        vschema::object().into(),
        vschema::object()
            .field("a", vschema::number())
            .field("b", vschema::string().required().default("x"))
            .into(),
        vschema::object()
            .preserve()
            .max(3)
            .field("c", vschema::array().item(vschema::any()))
            .into(),
        vschema::or()
            .validator(vschema::string())
            .validator(vschema::number())
            .into(),
        vschema::or().into(),
        vschema::and()
            .validator(vschema::any().required())
            .validator(vschema::not(vschema::string().required()))
            .into(),
        vschema::not(vschema::object().required()).into(),
    ]
}

// -----------------------------------------------------------------------
// Properties over every tree
// -----------------------------------------------------------------------

proptest! {
    #[test]
    fn validate_iff_parse(val in arb_json_value()) {
        for tree in trees() {
            prop_assert_eq!(tree.validate_value(&val), tree.parse_value(&val).is_ok());
        }
    }

    #[test]
    fn round_trip_keeps_behavior(val in arb_json_value()) {
        let registry = Registry::new();
        for tree in trees() {
            let rebuilt = registry.from_json(&tree.to_json()).unwrap();
            prop_assert_eq!(tree.parse_value(&val).ok(), rebuilt.parse_value(&val).ok());
        }
    }

    #[test]
    fn primitives_are_idempotent(val in arb_json_value()) {
        let primitives: Vec<ZSchema> = vec![
            vschema::any().into(),
            vschema::boolean().into(),
            vschema::number().integer().into(),
            vschema::number().min(0.0).default(1.0).into(),
            vschema::string().min(2).default("zz").into(),
        ];
        for tree in primitives {
            if let Ok(once) = tree.parse_value(&val) {
                let twice = tree.parse_value(&once);
                prop_assert_eq!(twice.ok(), Some(once));
            }
        }
    }

    #[test]
    fn object_output_only_has_declared_keys(val in arb_json_value()) {
        let tree = vschema::object()
            .field("a", vschema::any())
            .field("b", vschema::any());
        if let Ok(Value::Object(out)) = tree.parse_value(&val) {
            prop_assert!(out.keys().all(|k| k == "a" || k == "b"));
        }
    }

    #[test]
    fn required_default_never_fails_on_null(n in -1e6f64..1e6, s in ".*", b in any::<bool>()) {
        prop_assert!(vschema::number().required().default(n).parse_value(&Value::Null).is_ok());
        prop_assert!(vschema::string().required().default(s).parse_value(&Value::Null).is_ok());
        prop_assert!(vschema::boolean().required().default(b).parse_value(&Value::Null).is_ok());
    }
}

// -----------------------------------------------------------------------
// Never panics on schema input
// -----------------------------------------------------------------------

proptest! {
    #[test]
    fn from_json_never_panics(val in arb_json_value()) {
        let registry = Registry::new();
        let _ = registry.from_json(&val);
    }

    #[test]
    fn from_json_with_type_never_panics(
        ty in prop_oneof![
            Just("any"), Just("boolean"), Just("number"), Just("string"),
            Just("array"), Just("object"), Just("or"), Just("and"), Just("not"),
        ],
        rules in prop::collection::vec(
            (
                prop_oneof![
                    Just("required"), Just("default"), Just("min"), Just("max"),
                    Just("integer"), Just("equals"), Just("matches"), Just("item"),
                    Just("schema"), Just("validators"), Just("validator"),
                ],
                arb_json_value(),
            ),
            0..5,
        ),
        input in arb_json_value(),
    ) {
        let mut map = serde_json::Map::new();
        map.insert("type".into(), Value::from(ty));
        for (key, value) in rules {
            map.insert(key.into(), value);
        }
        let registry = Registry::new();
        if let Ok(tree) = registry.from_json(&Value::Object(map)) {
            let _ = tree.parse_value(&input);
            let _ = tree.to_json();
        }
    }

    #[test]
    fn pattern_parse_never_panics(s in ".*") {
        let _ = Pattern::parse(&s);
    }
}
