//! Per-path coercion of assigned values.
//!
//! Handlers are registered under a pattern:
//!
//! | Pattern | Matches |
//! |---------|---------|
//! | `"user.age"` | exactly that label |
//! | `"*.age"` | any label whose last segment is `age`, at any depth |
//! | `"*"` | every label |
//!
//! The first match in that order wins; without a match the value is stored
//! unchanged.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use vigil_core::Value;

/// Coercion handler: receives the assigned value and the full label.
pub type CoerceFn = Arc<dyn Fn(Value, &str) -> Value + Send + Sync>;

/// Pattern matching any label.
pub const ANY: &str = "*";

/// Prefix of patterns matching a label's final segment.
pub const ANY_DEPTH_PREFIX: &str = "*.";

/// Lookup table of coercion handlers.
///
/// Cloning a `Coercion` shares the table: handlers added afterwards apply to
/// every monitor configured with any clone of it.
#[derive(Clone, Default)]
pub struct Coercion {
    handlers: Arc<RwLock<HashMap<String, CoerceFn>>>,
}

impl Coercion {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style variant of [`Coercion::insert`].
    pub fn with<F>(self, pattern: impl Into<String>, handler: F) -> Self
    where
        F: Fn(Value, &str) -> Value + Send + Sync + 'static,
    {
        self.insert(pattern, handler);
        self
    }

    /// Register `handler` under `pattern`, replacing any previous handler.
    pub fn insert<F>(&self, pattern: impl Into<String>, handler: F)
    where
        F: Fn(Value, &str) -> Value + Send + Sync + 'static,
    {
        self.handlers.write().insert(pattern.into(), Arc::new(handler));
    }

    pub fn remove(&self, pattern: &str) -> bool {
        self.handlers.write().remove(pattern).is_some()
    }

    /// Select the handler for property `name` at `label`.
    pub fn resolve(&self, label: &str, name: &str) -> Option<CoerceFn> {
        let handlers = self.handlers.read();
        handlers
            .get(label)
            .or_else(|| handlers.get(&format!("{ANY_DEPTH_PREFIX}{name}")))
            .or_else(|| handlers.get(ANY))
            .cloned()
    }

    /// Coerce `value` for property `name` at `label`.
    pub fn apply(&self, label: &str, name: &str, value: Value) -> Value {
        // the table lock is released before the handler runs
        match self.resolve(label, name) {
            Some(handler) => handler(value, label),
            None => value,
        }
    }

    pub fn patterns(&self) -> Vec<String> {
        let mut patterns: Vec<String> = self.handlers.read().keys().cloned().collect();
        patterns.sort();
        patterns
    }

    pub fn len(&self) -> usize {
        self.handlers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.read().is_empty()
    }
}

impl fmt::Debug for Coercion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Coercion")
            .field("patterns", &self.patterns())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(tag: &'static str) -> impl Fn(Value, &str) -> Value + Send + Sync + 'static {
        move |value: Value, label: &str| {
            Value::from(format!("{tag} @{label}: {}", value.as_str().unwrap_or_default()))
        }
    }

    #[test]
    fn test_precedence() {
        let coercion = Coercion::new()
            .with("a.b", tag("exact"))
            .with("*.b", tag("segment"))
            .with("*", tag("global"));

        let exact = coercion.apply("a.b", "b", Value::from("v"));
        assert_eq!(exact.as_str(), Some("exact @a.b: v"));

        let segment = coercion.apply("x.b", "b", Value::from("v"));
        assert_eq!(segment.as_str(), Some("segment @x.b: v"));

        let global = coercion.apply("y", "y", Value::from("v"));
        assert_eq!(global.as_str(), Some("global @y: v"));
    }

    #[test]
    fn test_no_match_keeps_value() {
        let coercion = Coercion::new().with("a", tag("exact"));
        let value = coercion.apply("b", "b", Value::Int(3));
        assert_eq!(value.as_int(), Some(3));
    }

    #[test]
    fn test_segment_pattern_matches_top_level_name() {
        let coercion = Coercion::new().with("*.b", tag("segment"));
        let value = coercion.apply("b", "b", Value::from("v"));
        assert_eq!(value.as_str(), Some("segment @b: v"));
    }

    #[test]
    fn test_clones_share_the_table() {
        let coercion = Coercion::new();
        let shared = coercion.clone();

        shared.insert("late", tag("late"));
        assert_eq!(coercion.len(), 1);
        assert!(coercion.resolve("late", "late").is_some());

        assert!(coercion.remove("late"));
        assert!(shared.is_empty());
    }
}
