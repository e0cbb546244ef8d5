//! Deciding whether an assignment actually changes a property.

use std::fmt;
use std::sync::Arc;
use vigil_core::Value;

/// Custom comparator: `(current, candidate, label) -> equal`.
///
/// `current` is `None` when the property does not exist yet.
pub type CompareFn = Arc<dyn Fn(Option<&Value>, &Value, &str) -> bool + Send + Sync>;

/// Equality policy of a monitor.
///
/// Without a comparator values are compared with [`Value::strict_eq`]. A
/// configured comparator is authoritative: when it reports equal, nothing is
/// tracked or stored even if the values differ, and when it reports
/// different, the change is tracked even if the values are identical.
#[derive(Clone, Default)]
pub struct Equality {
    custom: Option<CompareFn>,
}

impl Equality {
    pub fn strict() -> Self {
        Self { custom: None }
    }

    pub fn custom<F>(comparator: F) -> Self
    where
        F: Fn(Option<&Value>, &Value, &str) -> bool + Send + Sync + 'static,
    {
        Self {
            custom: Some(Arc::new(comparator)),
        }
    }

    pub fn is_custom(&self) -> bool {
        self.custom.is_some()
    }

    /// True if assigning `candidate` over `current` at `label` is not a change.
    pub fn same(&self, current: Option<&Value>, candidate: &Value, label: &str) -> bool {
        match &self.custom {
            Some(comparator) => comparator(current, candidate, label),
            None => current.is_some_and(|c| c.strict_eq(candidate)),
        }
    }
}

impl fmt::Debug for Equality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.custom {
            Some(_) => f.write_str("Equality::Custom"),
            None => f.write_str("Equality::Strict"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strict() {
        let equality = Equality::strict();
        assert!(equality.same(Some(&Value::Int(1)), &Value::Int(1), "a"));
        assert!(!equality.same(Some(&Value::Int(1)), &Value::from("1"), "a"));
        assert!(!equality.same(None, &Value::Null, "a"));
    }

    #[test]
    fn test_custom_is_authoritative() {
        let never = Equality::custom(|_, _, _| false);
        assert!(!never.same(Some(&Value::Int(1)), &Value::Int(1), "a"));

        let always = Equality::custom(|_, _, _| true);
        assert!(always.same(Some(&Value::Int(1)), &Value::Int(2), "a"));
    }

    #[test]
    fn test_custom_receives_label() {
        let equality = Equality::custom(|_, _, label| label == "ignored");
        assert!(equality.same(None, &Value::Null, "ignored"));
        assert!(!equality.same(None, &Value::Null, "other"));
    }
}
