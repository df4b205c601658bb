use std::sync::Arc;
use std::thread;

use serde_json::json;
use vschema::prelude::*;

fn assert_send_sync<T: Send + Sync + Clone>() {}

#[test]
fn validators_are_send_sync() {
    assert_send_sync::<ZSchema>();
    assert_send_sync::<ZObject>();
    assert_send_sync::<ZArray>();
    assert_send_sync::<ZOr>();
    assert_send_sync::<ZNot>();
    assert_send_sync::<ZString>();
    assert_send_sync::<Registry>();
}

#[test]
fn shared_tree_gives_identical_results() {
    let registry = Registry::new();
    let tree = registry
        .from_json(&json!({
            "type": "object",
            "schema": {
                "n": {"type": "number", "required": true, "integer": true, "max": 1000},
                "s": {"type": "string", "matches": "/^[a-z]*$/"}
            }
        }))
        .unwrap();

    let inputs: Vec<_> = (0..200)
        .map(|i| json!({"n": i * 7, "s": if i % 3 == 0 { "abc" } else { "ABC" }, "z": i}))
        .collect();
    let expected: Vec<_> = inputs.iter().map(|v| tree.parse_value(v).ok()).collect();

    thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                let got: Vec<_> = inputs.iter().map(|v| tree.parse_value(v).ok()).collect();
                assert_eq!(got, expected);
            });
        }
    });
}

#[test]
fn custom_factory_shared_across_threads() {
    let mut registry = Registry::new();
    registry.set_validator("not_one", |_, _| {
        Ok(vschema::and()
            .validator(vschema::number().required().integer())
            .validator(vschema::not(vschema::number().equals(1.0)))
            .into())
    });
    let registry = Arc::new(registry);

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                let tree = registry.from_json(&json!({"type": "not_one"})).unwrap();
                (tree.validate_value(&json!(2)), tree.validate_value(&json!(1)))
            })
        })
        .collect();
    for h in handles {
        assert_eq!(h.join().unwrap(), (true, false));
    }
}
