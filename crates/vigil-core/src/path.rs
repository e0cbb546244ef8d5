//! Hierarchical property labels.
//!
//! A label names a location in a value graph by joining property names
//! with a separator, e.g. `"user.address.city"` or `"items.0"`.

use crate::error::{CoreError, Result};

/// Default separator between the segments of a label.
pub const DEFAULT_SEPARATOR: &str = ".";

/// Name reserved for a monitor's tracking context. It is never copied by
/// [`deep_clone`](crate::deep_clone) and never tracked as a property.
pub const CONTEXT_KEY: &str = "$context";

/// Builds and validates labels for one separator.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PathLabel {
    separator: String,
}

impl PathLabel {
    pub fn new(separator: impl Into<String>) -> Self {
        Self {
            separator: separator.into(),
        }
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }

    /// Reject property names containing the separator.
    pub fn validate(&self, name: &str) -> Result<()> {
        if !self.separator.is_empty() && name.contains(self.separator.as_str()) {
            return Err(CoreError::InvalidPropertyName {
                name: name.to_string(),
                separator: self.separator.clone(),
            });
        }
        Ok(())
    }

    /// Label of property `name` below `prefix`. The prefix is either empty
    /// or already ends with the separator.
    pub fn join(&self, prefix: &str, name: &str) -> String {
        let mut label = String::with_capacity(prefix.len() + name.len());
        label.push_str(prefix);
        label.push_str(name);
        label
    }

    /// Prefix used for properties nested below `label`.
    pub fn child_prefix(&self, label: &str) -> String {
        let mut prefix = String::with_capacity(label.len() + self.separator.len());
        prefix.push_str(label);
        prefix.push_str(&self.separator);
        prefix
    }

    /// Split a label into its segments.
    pub fn split<'a>(&self, label: &'a str) -> Vec<&'a str> {
        if self.separator.is_empty() {
            return vec![label];
        }
        label.split(self.separator.as_str()).collect()
    }

    /// Final segment of a label.
    pub fn last_segment<'a>(&self, label: &'a str) -> &'a str {
        if self.separator.is_empty() {
            return label;
        }
        label
            .rsplit_once(self.separator.as_str())
            .map(|(_, last)| last)
            .unwrap_or(label)
    }

    /// Labels of every strict ancestor, shortest first.
    ///
    /// `"a.b.c"` yields `["a", "a.b"]`.
    pub fn ancestors<'a>(&self, label: &'a str) -> Vec<&'a str> {
        if self.separator.is_empty() {
            return Vec::new();
        }
        label
            .match_indices(self.separator.as_str())
            .map(|(index, _)| &label[..index])
            .collect()
    }

    /// Number of segments.
    pub fn depth(&self, label: &str) -> usize {
        self.split(label).len()
    }
}

impl Default for PathLabel {
    fn default() -> Self {
        Self::new(DEFAULT_SEPARATOR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_separator() {
        let labels = PathLabel::default();
        assert!(labels.validate("plain").is_ok());
        assert!(matches!(
            labels.validate("with.period"),
            Err(CoreError::InvalidPropertyName { .. })
        ));

        let piped = PathLabel::new("|");
        assert!(piped.validate("with.period").is_ok());
        assert!(piped.validate("with|pipe").is_err());
    }

    #[test]
    fn test_join_and_child_prefix() {
        let labels = PathLabel::default();
        let label = labels.join("", "obj");
        assert_eq!(label, "obj");

        let prefix = labels.child_prefix(&label);
        assert_eq!(prefix, "obj.");
        assert_eq!(labels.join(&prefix, "x"), "obj.x");
    }

    #[test]
    fn test_split_and_segments() {
        let labels = PathLabel::new("::");
        assert_eq!(labels.split("a::b::c"), vec!["a", "b", "c"]);
        assert_eq!(labels.last_segment("a::b::c"), "c");
        assert_eq!(labels.last_segment("single"), "single");
        assert_eq!(labels.depth("a::b::c"), 3);
        assert_eq!(labels.ancestors("a::b::c"), vec!["a", "a::b"]);
        assert!(labels.ancestors("a").is_empty());
    }
}
