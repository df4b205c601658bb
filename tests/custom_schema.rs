use std::sync::Arc;

use serde_json::{json, Map, Value};
use vschema::prelude::*;

/// Accepts strings that look like `user@host`.
#[derive(Clone, Default)]
struct Email {
    required: bool,
}

impl Validator for Email {
    fn type_name(&self) -> &str {
        "email"
    }

    fn parse_value(&self, value: &Value) -> Result<Value, ParseError> {
        match value {
            Value::Null if !self.required => Ok(Value::Null),
            Value::String(s) if s.split_once('@').map_or(false, |(u, h)| !u.is_empty() && h.contains('.')) => {
                Ok(Value::String(s.to_lowercase()))
            }
            other => Err(ParseError::custom("invalid_email", "Expected an email address", other)),
        }
    }

    fn to_json(&self) -> Value {
        let mut out = Map::new();
        out.insert("type".into(), json!("email"));
        if self.required {
            out.insert("required".into(), json!(true));
        }
        Value::Object(out)
    }
}

fn registry_with_email() -> Registry {
    let mut registry = Registry::new();
    registry.set_validator("Email", |map, _| {
        let required = map.get("required").and_then(Value::as_bool).unwrap_or(false);
        Ok(ZSchema::custom(Email { required }))
    });
    registry
}

#[test]
fn custom_validator_by_type_name() {
    let registry = registry_with_email();
    assert!(registry.has_validator("email"));
    assert!(registry.has_validator("EMAIL"));

    let s = registry.from_json(&json!({"type": "email"})).unwrap();
    assert_eq!(s.parse_value(&json!("A@B.io")).unwrap(), json!("a@b.io"));
    let err = s.parse_value(&json!("nope")).unwrap_err();
    assert_eq!(err.code.key(), "invalid_email");
}

#[test]
fn custom_validator_nested_in_builtins() {
    let registry = registry_with_email();
    let s = registry
        .from_json(&json!({
            "type": "object",
            "schema": {
                "contact": {"type": "email", "required": true},
                "cc": {"type": "array", "item": {"type": "email", "required": true}}
            }
        }))
        .unwrap();

    let out = s
        .parse_value(&json!({"contact": "Me@X.org", "cc": ["a@b.c"]}))
        .unwrap();
    assert_eq!(out, json!({"contact": "me@x.org", "cc": ["a@b.c"]}));

    let err = s
        .parse_value(&json!({"contact": "me@x.org", "cc": ["bad"]}))
        .unwrap_err();
    assert_eq!(err.path_string(), ".cc[0]");
}

#[test]
fn custom_validator_round_trips() {
    let registry = registry_with_email();
    let tree: ZSchema = vschema::array()
        .item(ZSchema::custom(Email { required: true }))
        .into();
    let doc = registry.to_json(&tree);
    assert_eq!(
        doc,
        json!({"type": "array", "item": {"type": "email", "required": true}})
    );
    let rebuilt = registry.from_json(&doc).unwrap();
    assert_eq!(rebuilt.to_json(), doc);
    assert!(rebuilt.validate_value(&json!(["x@y.z"])));
    assert!(!rebuilt.validate_value(&json!([null])));
}

#[test]
fn custom_validator_from_arc() {
    let shared: Arc<dyn Validator> = Arc::new(Email::default());
    let s = vschema::or()
        .validator(shared.clone())
        .validator(vschema::number());
    assert!(s.validate_value(&json!("a@b.c")));
    assert!(s.validate_value(&json!(1)));
    assert!(!s.validate_value(&json!("a")));
}

#[test]
fn alias_resolves_to_builtin() {
    let mut registry = Registry::new();
    registry.set_validator("int", |map, reg| {
        let mut map = map.clone();
        map.insert("type".into(), json!("number"));
        map.insert("integer".into(), json!(true));
        reg.from_json(&Value::Object(map))
    });

    let s = registry
        .from_json(&json!({"type": "int", "min": 0, "max": 9}))
        .unwrap();
    assert!(s.validate_value(&json!(3)));
    assert!(!s.validate_value(&json!(3.5)));
    assert!(!s.validate_value(&json!(10)));
    // serializes as the underlying kind
    assert_eq!(s.to_json()["type"], json!("number"));
}

#[test]
fn overriding_a_builtin() {
    let mut registry = Registry::new();
    let previous = registry.set_validator("string", |map, reg| {
        let mut map = map.clone();
        map.insert("type".into(), json!("any"));
        reg.from_json(&Value::Object(map))
    });
    assert!(previous.is_some());

    let s = registry.from_json(&json!({"type": "string"})).unwrap();
    assert!(s.validate_value(&json!(5)));
}

#[test]
fn get_validator_returns_factory() {
    let registry = Registry::new();
    let factory = registry.get_validator("Boolean").unwrap();
    let map = Map::new();
    let s = factory(&map, &registry).unwrap();
    assert_eq!(s.type_name(), "boolean");
    assert!(registry.get_validator("missing").is_none());
}

#[test]
fn delete_and_list_validators() {
    let mut registry = Registry::new();
    assert_eq!(
        registry.type_names(),
        vec!["and", "any", "array", "boolean", "not", "number", "object", "or", "string"]
    );
    assert!(registry.delete_validator("OR"));
    assert!(!registry.delete_validator("or"));
    assert!(matches!(
        registry.from_json(&json!({"type": "or"})),
        Err(SchemaError::UnknownType(_))
    ));
    // nested references go through the same table
    assert!(matches!(
        registry.from_json(&json!({"type": "array", "item": {"type": "or"}})),
        Err(SchemaError::UnknownType(_))
    ));
}

#[test]
fn alias_without_type_rewrite_is_an_error() {
    let mut registry = Registry::new();
    registry.set_validator("int", |map, reg| {
        ZNumber::from_json(&Value::Object(map.clone()), reg)
    });
    let err = registry.from_json(&json!({"type": "int"})).unwrap_err();
    assert!(matches!(
        &err,
        SchemaError::TypeMismatch { expected, found } if expected == "number" && found == "int"
    ));
    assert_eq!(err.to_string(), "Expected schema.type to be \"number\", found \"int\"");

    // nested occurrences fail the same way
    assert!(matches!(
        registry.from_json(&json!({"type": "array", "item": {"type": "int"}})),
        Err(SchemaError::TypeMismatch { .. })
    ));
}

#[test]
fn deep_nesting_is_an_error() {
    let registry = Registry::new();
    let nest = |levels: usize| {
        (0..levels).fold(json!({"type": "any"}), |inner, _| {
            json!({"type": "array", "item": inner})
        })
    };
    assert!(registry.from_json(&nest(MAX_DEPTH - 1)).is_ok());
    assert!(matches!(
        registry.from_json(&nest(MAX_DEPTH)),
        Err(SchemaError::TooDeep(MAX_DEPTH))
    ));
}

#[test]
fn factory_reports_custom_error() {
    let mut registry = Registry::new();
    registry.set_validator("range", |map, reg| {
        let bound = |key: &str| map.get(key).and_then(Value::as_f64);
        match (bound("min"), bound("max")) {
            (Some(min), Some(max)) if min <= max => {
                let mut map = map.clone();
                map.insert("type".into(), json!("number"));
                reg.from_json(&Value::Object(map))
            }
            _ => Err(SchemaError::Custom("range needs min <= max".into())),
        }
    });

    let s = registry
        .from_json(&json!({"type": "range", "min": 1, "max": 3}))
        .unwrap();
    assert!(s.validate_value(&json!(2)));

    let err = registry
        .from_json(&json!({"type": "object", "schema": {"r": {"type": "range", "min": 5, "max": 1}}}))
        .unwrap_err();
    assert!(matches!(err, SchemaError::Custom(_)));
    assert_eq!(err.to_string(), "range needs min <= max");
}

#[test]
fn empty_registry() {
    let mut registry = Registry::empty();
    assert!(registry.type_names().is_empty());
    assert!(matches!(
        registry.from_json(&json!({"type": "string"})),
        Err(SchemaError::UnknownType(_))
    ));
    registry.set_validator("string", |map, reg| {
        ZString::from_json(&Value::Object(map.clone()), reg)
    });
    assert!(registry.from_json(&json!({"type": "string", "min": 1})).is_ok());
}

#[test]
fn registry_constructors() {
    let registry = Registry::new();
    let s = registry
        .object()
        .field("n", registry.number().required())
        .field("ok", registry.not(registry.boolean().equals(false)));
    assert!(s.validate_value(&json!({"n": 1, "ok": true})));
    assert!(!s.validate_value(&json!({"n": 1, "ok": false})));
    assert!(registry.any().validate_value(&json!(1)));
    assert!(registry.string().validate_value(&json!("s")));
    assert!(registry.array().validate_value(&json!([])));
    assert!(!registry.or().validate_value(&json!(1)));
    assert!(registry.and().validate_value(&json!(1)));
}

#[test]
fn zschema_from_json_uses_registry() {
    let registry = registry_with_email();
    let s = ZSchema::from_json(&json!({"type": "email"}), &registry).unwrap();
    assert!(matches!(s, ZSchema::Custom(_)));
}
