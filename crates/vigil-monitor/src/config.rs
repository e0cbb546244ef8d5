//! Monitor configuration.

use crate::coercion::Coercion;
use crate::context::TrackingContext;
use crate::equality::Equality;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use vigil_core::{Value, DEFAULT_SEPARATOR};

/// Configuration of a monitor.
///
/// Child monitors created while reading nested composites inherit this
/// configuration with `prefix` extended by the property's label.
#[derive(Clone, Debug)]
pub struct MonitorConfig {
    /// Tracking context to share instead of creating a fresh one.
    pub context: Option<Arc<TrackingContext>>,
    /// Emit a diagnostic when a changed property is changed again before
    /// commit or roll back.
    pub warn: bool,
    /// Reject such repeated changes with an error.
    pub fail: bool,
    /// Monitor nested composites as well.
    pub recursive: bool,
    /// Prepended to every label tracked by this monitor.
    pub prefix: String,
    /// Track own (or new) properties only, leaving inherited ones alone.
    pub just_owned: bool,
    pub coercion: Coercion,
    pub equality: Equality,
    pub separator: String,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            context: None,
            warn: true,
            fail: true,
            recursive: false,
            prefix: String::new(),
            just_owned: true,
            coercion: Coercion::new(),
            equality: Equality::strict(),
            separator: DEFAULT_SEPARATOR.to_string(),
        }
    }
}

impl MonitorConfig {
    pub fn builder() -> MonitorConfigBuilder {
        MonitorConfigBuilder::new()
    }

    /// Lift plain options into a full configuration.
    pub fn from_options(options: MonitorOptions) -> Self {
        Self {
            warn: options.warn,
            fail: options.fail,
            recursive: options.recursive,
            prefix: options.prefix,
            just_owned: options.just_owned,
            separator: options.separator,
            ..Default::default()
        }
    }

    /// The serializable part of this configuration.
    pub fn options(&self) -> MonitorOptions {
        MonitorOptions {
            warn: self.warn,
            fail: self.fail,
            recursive: self.recursive,
            prefix: self.prefix.clone(),
            just_owned: self.just_owned,
            separator: self.separator.clone(),
        }
    }
}

/// Plain monitor options, loadable with serde.
///
/// ```rust
/// use vigil_monitor::{MonitorConfig, MonitorOptions};
///
/// let options: MonitorOptions =
///     serde_json::from_str(r#"{"recursive": true, "separator": "/"}"#).unwrap();
/// let config = MonitorConfig::from_options(options);
///
/// assert!(config.recursive);
/// assert!(config.fail);
/// assert_eq!(config.separator, "/");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorOptions {
    pub warn: bool,
    pub fail: bool,
    pub recursive: bool,
    pub prefix: String,
    pub just_owned: bool,
    pub separator: String,
}

impl Default for MonitorOptions {
    fn default() -> Self {
        MonitorConfig::default().options()
    }
}

/// Builder for monitor configuration.
pub struct MonitorConfigBuilder {
    config: MonitorConfig,
}

impl MonitorConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: MonitorConfig::default(),
        }
    }

    pub fn context(mut self, context: Arc<TrackingContext>) -> Self {
        self.config.context = Some(context);
        self
    }

    pub fn warn(mut self, enabled: bool) -> Self {
        self.config.warn = enabled;
        self
    }

    pub fn fail(mut self, enabled: bool) -> Self {
        self.config.fail = enabled;
        self
    }

    pub fn recursive(mut self, enabled: bool) -> Self {
        self.config.recursive = enabled;
        self
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.prefix = prefix.into();
        self
    }

    pub fn just_owned(mut self, enabled: bool) -> Self {
        self.config.just_owned = enabled;
        self
    }

    /// Use `coercion` as the handler table (shared, not copied).
    pub fn coercion(mut self, coercion: Coercion) -> Self {
        self.config.coercion = coercion;
        self
    }

    /// Register a single coercion handler.
    pub fn coerce<F>(self, pattern: impl Into<String>, handler: F) -> Self
    where
        F: Fn(Value, &str) -> Value + Send + Sync + 'static,
    {
        self.config.coercion.insert(pattern, handler);
        self
    }

    pub fn custom_compare<F>(mut self, comparator: F) -> Self
    where
        F: Fn(Option<&Value>, &Value, &str) -> bool + Send + Sync + 'static,
    {
        self.config.equality = Equality::custom(comparator);
        self
    }

    pub fn separator(mut self, separator: impl Into<String>) -> Self {
        self.config.separator = separator.into();
        self
    }

    pub fn build(self) -> MonitorConfig {
        self.config
    }
}

impl Default for MonitorConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
