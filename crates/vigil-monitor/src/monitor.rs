//! Monitors intercepting reads and writes of composite values.

use crate::config::MonitorConfig;
use crate::context::TrackingContext;
use crate::error::{MonitorError, Result};
use std::sync::Arc;
use tracing::trace;
use vigil_core::{Ownership, PathLabel, Value, CONTEXT_KEY, LENGTH};

/// Result of reading a property through a [`Monitor`].
#[derive(Clone, Debug)]
pub enum Property {
    /// A scalar, or a composite not monitored under the configuration.
    Plain(Value),
    /// A composite monitored with the parent's tracking context.
    Monitored(Monitor),
}

impl Property {
    pub fn value(&self) -> &Value {
        match self {
            Property::Plain(value) => value,
            Property::Monitored(monitor) => monitor.value(),
        }
    }

    pub fn into_value(self) -> Value {
        match self {
            Property::Plain(value) => value,
            Property::Monitored(monitor) => monitor.value,
        }
    }

    pub fn monitored(self) -> Option<Monitor> {
        match self {
            Property::Monitored(monitor) => Some(monitor),
            Property::Plain(_) => None,
        }
    }

    pub fn is_monitored(&self) -> bool {
        matches!(self, Property::Monitored(_))
    }
}

impl From<Property> for Value {
    fn from(property: Property) -> Self {
        property.into_value()
    }
}

/// Interception layer bound to one composite value.
///
/// Reads behave like reads of the value itself. Writes through the monitor
/// are recorded in its [`TrackingContext`] so they can be rolled back;
/// writes made through any other handle of the value are not.
///
/// ```rust
/// use serde_json::json;
/// use vigil_core::Value;
/// use vigil_monitor::{Monitor, MonitorConfig};
///
/// let monitor = Monitor::wrap(Value::from(json!({"n": 1000})), MonitorConfig::default()).unwrap();
/// monitor.set("n", "1000").unwrap();
///
/// let context = monitor.context();
/// assert_eq!(context.changed_labels(), vec!["n"]);
///
/// context.roll_back().unwrap();
/// assert_eq!(monitor.to_json(), json!({"n": 1000}));
/// ```
#[derive(Clone, Debug)]
pub struct Monitor {
    value: Value,
    config: Arc<MonitorConfig>,
    context: Arc<TrackingContext>,
    labels: PathLabel,
}

impl Monitor {
    /// Start monitoring `value`.
    ///
    /// Uses `config.context` when set, otherwise creates a new context rooted
    /// at `value`. Fails with [`MonitorError::InvalidArgument`] for scalars.
    pub fn wrap(value: Value, mut config: MonitorConfig) -> Result<Self> {
        if !value.is_composite() {
            return Err(MonitorError::InvalidArgument(value.type_name()));
        }

        let shared = config.context.take();
        let config = Arc::new(config);
        let context =
            shared.unwrap_or_else(|| TrackingContext::new(value.clone(), Arc::clone(&config)));

        Ok(Self::attach(value, config, context))
    }

    pub(crate) fn attach(
        value: Value,
        config: Arc<MonitorConfig>,
        context: Arc<TrackingContext>,
    ) -> Self {
        Self {
            labels: PathLabel::new(config.separator.clone()),
            value,
            config,
            context,
        }
    }

    /// The tracking context shared by this monitor's tree.
    pub fn context(&self) -> Arc<TrackingContext> {
        Arc::clone(&self.context)
    }

    /// The monitored value itself. Writes through it are not tracked.
    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Prefix of the labels tracked by this monitor.
    pub fn prefix(&self) -> &str {
        &self.config.prefix
    }

    pub fn labels(&self) -> &PathLabel {
        &self.labels
    }

    /// Read property `name`.
    ///
    /// Composite properties are returned as [`Property::Monitored`] when
    /// monitoring is recursive and the property is owned, `just_owned` is
    /// off, or the property is a sequence.
    pub fn get(&self, name: &str) -> Result<Option<Property>> {
        self.reject_reserved(name)?;
        self.labels.validate(name)?;

        let Some(value) = self.value.get_property(name) else {
            return Ok(None);
        };

        let descend = self.config.recursive
            && value.is_composite()
            && (!self.config.just_owned
                || value.is_sequence()
                || self.value.ownership(name) == Ownership::Owned);
        if descend {
            let label = self.labels.join(&self.config.prefix, name);
            return Ok(Some(Property::Monitored(self.child(&label, value))));
        }

        Ok(Some(Property::Plain(value)))
    }

    /// Read property `name` without monitoring it.
    pub fn get_value(&self, name: &str) -> Result<Option<Value>> {
        Ok(self.get(name)?.map(Property::into_value))
    }

    /// Write property `name`, tracking the change.
    ///
    /// A failing write leaves both the value and the context unchanged.
    pub fn set(&self, name: &str, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        self.reject_reserved(name)?;

        let current = self.value.get_property(name);
        if current.as_ref().is_some_and(|current| current.strict_eq(&value)) {
            return Ok(());
        }

        self.labels.validate(name)?;
        let label = self.labels.join(&self.config.prefix, name);

        if self.config.just_owned && self.value.ownership(name) == Ownership::Inherited {
            trace!(label = %label, "overriding inherited property untracked");
            self.value.set_property(name, value)?;
            return Ok(());
        }

        let value = self.config.coercion.apply(&label, name, value);
        self.value.check_assignable(name, &value)?;

        if self.config.equality.same(current.as_ref(), &value, &label) {
            return Ok(());
        }

        let mark = self.context.track(self, name, &label, current, &value)?;
        if let Err(err) = self.value.set_property(name, value) {
            self.context.untrack(mark);
            return Err(err.into());
        }
        Ok(())
    }

    /// Names of own properties.
    pub fn keys(&self) -> Vec<String> {
        self.value.property_names()
    }

    pub fn to_json(&self) -> serde_json::Value {
        self.value.to_json()
    }

    /// Number of items of a monitored sequence.
    pub fn len(&self) -> Result<usize> {
        self.value
            .sequence_len()
            .ok_or(MonitorError::NotASequence(self.value.type_name()))
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Append `item`, returning the new length.
    pub fn push(&self, item: impl Into<Value>) -> Result<usize> {
        let length = self.len()?;
        self.set(&length.to_string(), item)?;
        self.set(LENGTH, length + 1)?;
        Ok(length + 1)
    }

    /// Remove and return the last item.
    pub fn pop(&self) -> Result<Option<Value>> {
        let length = self.len()?;
        if length == 0 {
            return Ok(None);
        }
        let last = self.value.get_property(&(length - 1).to_string());
        self.set(LENGTH, length - 1)?;
        Ok(last)
    }

    /// Insert `item` in front, returning the new length.
    pub fn unshift(&self, item: impl Into<Value>) -> Result<usize> {
        let length = self.len()?;
        for index in (0..length).rev() {
            let moved = self.item(index);
            self.set(&(index + 1).to_string(), moved)?;
        }
        self.set("0", item)?;
        self.set(LENGTH, length + 1)?;
        Ok(length + 1)
    }

    /// Remove and return the first item.
    pub fn shift(&self) -> Result<Option<Value>> {
        let length = self.len()?;
        if length == 0 {
            return Ok(None);
        }
        let first = self.value.get_property("0");
        for index in 1..length {
            let moved = self.item(index);
            self.set(&(index - 1).to_string(), moved)?;
        }
        self.set(LENGTH, length - 1)?;
        Ok(first)
    }

    fn item(&self, index: usize) -> Value {
        self.value
            .get_property(&index.to_string())
            .unwrap_or_default()
    }

    fn child(&self, label: &str, value: Value) -> Monitor {
        let config = MonitorConfig {
            context: None,
            prefix: self.labels.child_prefix(label),
            ..(*self.config).clone()
        };
        Self::attach(value, Arc::new(config), Arc::clone(&self.context))
    }

    fn reject_reserved(&self, name: &str) -> Result<()> {
        if name == CONTEXT_KEY {
            return Err(MonitorError::ReservedProperty(name.to_string()));
        }
        Ok(())
    }
}

impl From<Monitor> for Value {
    fn from(monitor: Monitor) -> Self {
        monitor.value
    }
}
