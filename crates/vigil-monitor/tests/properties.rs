//! Property-based tests for change tracking
//!
//! These tests verify the guarantees of a tracking context:
//!  - Roll back restores the state before the first tracked write
//!  - Commit keeps every written value and forgets the changes
//!  - Writing current values records nothing

use proptest::prelude::*;
use serde_json::json;
use vigil_core::Value;
use vigil_monitor::{Monitor, MonitorConfig, MonitorError, Property};

#[derive(Clone, Debug)]
enum Op {
    SetA(i8),
    SetC(i8),
    ReplaceB(i8),
    Push(i8),
    Pop,
    Shift,
    Unshift(i8),
    Add(u8, i8),
}

fn fixture_strategy() -> impl Strategy<Value = serde_json::Value> {
    (any::<i8>(), any::<i8>(), prop::collection::vec(any::<i8>(), 0..4))
        .prop_map(|(a, c, d)| json!({"a": a, "b": {"c": c, "d": d}}))
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        any::<i8>().prop_map(Op::SetA),
        any::<i8>().prop_map(Op::SetC),
        any::<i8>().prop_map(Op::ReplaceB),
        any::<i8>().prop_map(Op::Push),
        Just(Op::Pop),
        Just(Op::Shift),
        any::<i8>().prop_map(Op::Unshift),
        (0u8..3, any::<i8>()).prop_map(|(key, value)| Op::Add(key, value)),
    ]
}

fn child(monitor: &Monitor, name: &str) -> Monitor {
    monitor
        .get(name)
        .unwrap()
        .and_then(Property::monitored)
        .unwrap()
}

fn apply(monitor: &Monitor, op: &Op) -> vigil_monitor::Result<()> {
    let items = || child(&child(monitor, "b"), "d");
    match op {
        Op::SetA(value) => monitor.set("a", i64::from(*value)),
        Op::SetC(value) => child(monitor, "b").set("c", i64::from(*value)),
        Op::ReplaceB(value) => monitor.set("b", Value::from(json!({"c": value, "d": []}))),
        Op::Push(value) => items().push(i64::from(*value)).map(|_| ()),
        Op::Pop => items().pop().map(|_| ()),
        Op::Shift => items().shift().map(|_| ()),
        Op::Unshift(value) => items().unshift(i64::from(*value)).map(|_| ()),
        Op::Add(key, value) => monitor.set(&format!("k{key}"), i64::from(*value)),
    }
}

/// Apply `ops`, skipping writes rejected as repeated changes.
fn run(monitor: &Monitor, ops: &[Op]) -> Result<(), TestCaseError> {
    for op in ops {
        match apply(monitor, op) {
            Ok(()) | Err(MonitorError::RepeatedChange { .. }) => {}
            Err(other) => return Err(TestCaseError::fail(format!("{op:?} failed: {other}"))),
        }
    }
    Ok(())
}

fn monitor(fixture: &serde_json::Value) -> Monitor {
    let config = MonitorConfig::builder().recursive(true).warn(false).build();
    Monitor::wrap(Value::from(fixture.clone()), config).unwrap()
}

proptest! {
    #[test]
    fn roll_back_restores_origin(
        fixture in fixture_strategy(),
        ops in prop::collection::vec(op_strategy(), 0..12)
    ) {
        let monitor = monitor(&fixture);
        run(&monitor, &ops)?;

        let context = monitor.context();
        context.roll_back().unwrap();

        prop_assert_eq!(monitor.to_json(), fixture);
        prop_assert!(context.changed().is_empty());
        prop_assert!(!context.has_changed());
    }

    #[test]
    fn commit_keeps_current_state(
        fixture in fixture_strategy(),
        ops in prop::collection::vec(op_strategy(), 0..12)
    ) {
        let monitor = monitor(&fixture);
        run(&monitor, &ops)?;

        let before = monitor.to_json();
        let context = monitor.context();
        context.commit();

        prop_assert_eq!(monitor.to_json(), before.clone());
        prop_assert!(!context.has_changed());

        context.roll_back().unwrap();
        prop_assert_eq!(monitor.to_json(), before);
    }

    #[test]
    fn roll_back_after_commit_restores_committed_state(
        fixture in fixture_strategy(),
        first in prop::collection::vec(op_strategy(), 0..8),
        second in prop::collection::vec(op_strategy(), 0..8)
    ) {
        let monitor = monitor(&fixture);
        run(&monitor, &first)?;
        monitor.context().commit();
        let committed = monitor.to_json();

        run(&monitor, &second)?;
        monitor.context().roll_back().unwrap();

        prop_assert_eq!(monitor.to_json(), committed);
    }

    #[test]
    fn writing_current_values_records_nothing(fixture in fixture_strategy()) {
        let monitor = monitor(&fixture);
        let b = child(&monitor, "b");
        let d = child(&b, "d");

        monitor.set("a", monitor.get_value("a").unwrap().unwrap()).unwrap();
        b.set("c", b.get_value("c").unwrap().unwrap()).unwrap();
        for index in 0..d.len().unwrap() {
            let name = index.to_string();
            d.set(&name, d.get_value(&name).unwrap().unwrap()).unwrap();
        }

        prop_assert!(!monitor.context().has_changed());
    }

    #[test]
    fn clone_rolls_back_to_same_origin(
        fixture in fixture_strategy(),
        ops in prop::collection::vec(op_strategy(), 0..12)
    ) {
        let monitor = monitor(&fixture);
        run(&monitor, &ops)?;
        let current = monitor.to_json();

        let clone = monitor.context().clone_monitor(Default::default()).unwrap();
        prop_assert_eq!(clone.context().changed_labels(), monitor.context().changed_labels());
        clone.context().roll_back().unwrap();

        prop_assert_eq!(clone.to_json(), fixture);
        prop_assert_eq!(monitor.to_json(), current);
    }
}
