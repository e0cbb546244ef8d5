//! Property-based tests for the value model
//!
//! These tests verify:
//!  - A recursive clone is structurally equal to its source
//!  - A recursive clone shares no composite with its source
//!  - A shallow clone shares exactly the direct members
//!  - Strict equality implies structural equality

use proptest::prelude::*;
use serde_json::json;
use vigil_core::{deep_clone, Value};

fn json_strategy() -> impl Strategy<Value = serde_json::Value> {
    let leaf = prop_oneof![
        Just(serde_json::Value::Null),
        any::<bool>().prop_map(serde_json::Value::Bool),
        any::<i32>().prop_map(|i| json!(i)),
        "[a-z]{0,6}".prop_map(serde_json::Value::String),
    ];

    leaf.prop_recursive(4, 32, 5, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..5).prop_map(serde_json::Value::Array),
            prop::collection::btree_map("[a-z]{1,4}", inner, 0..5)
                .prop_map(|map| serde_json::Value::Object(map.into_iter().collect())),
        ]
    })
}

fn composite_strategy() -> impl Strategy<Value = serde_json::Value> {
    prop::collection::btree_map("[a-z]{1,4}", json_strategy(), 0..5)
        .prop_map(|map| serde_json::Value::Object(map.into_iter().collect()))
}

/// True if `a` and `b` have no composite payload in common.
fn disjoint(a: &Value, b: &Value) -> bool {
    if a.is_composite() && a.ptr_eq(b) {
        return false;
    }
    let names = a.property_names();
    names.iter().all(|name| match (a.get_property(name), b.get_property(name)) {
        (Some(x), Some(y)) => disjoint(&x, &y),
        _ => true,
    })
}

proptest! {
    #[test]
    fn recursive_clone_is_deep_equal(json in json_strategy()) {
        let value = Value::from(json.clone());
        let clone = deep_clone(&value, true);

        prop_assert!(clone.deep_eq(&value));
        prop_assert_eq!(clone.to_json(), json);
    }

    #[test]
    fn recursive_clone_shares_nothing(json in composite_strategy()) {
        let value = Value::from(json);
        let clone = deep_clone(&value, true);

        prop_assert!(disjoint(&value, &clone));
    }

    #[test]
    fn shallow_clone_shares_direct_members(json in composite_strategy()) {
        let value = Value::from(json);
        let clone = deep_clone(&value, false);

        prop_assert!(!clone.ptr_eq(&value));
        for name in value.property_names() {
            let original = value.get_property(&name).unwrap();
            let copied = clone.get_property(&name).unwrap();
            prop_assert!(copied.strict_eq(&original));
        }
    }

    #[test]
    fn mutating_clone_leaves_source_untouched(json in composite_strategy(), extra in any::<i64>()) {
        let value = Value::from(json.clone());
        let clone = deep_clone(&value, true);

        clone.set_property("injected", Value::Int(extra)).unwrap();
        for name in clone.property_names() {
            if let Some(Value::Record(_)) = clone.get_property(&name) {
                clone.get_property(&name).unwrap().set_property("nested", Value::Null).unwrap();
            }
        }

        prop_assert_eq!(value.to_json(), json);
    }

    #[test]
    fn strict_equality_implies_deep_equality(a in json_strategy(), b in json_strategy()) {
        let (a, b) = (Value::from(a), Value::from(b));
        if a.strict_eq(&b) {
            prop_assert!(a.deep_eq(&b));
        }
        prop_assert!(a.strict_eq(&a));
    }
}
