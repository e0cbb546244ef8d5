//! Records, their behavioral templates, and callable values.

use crate::fields::Fields;
use crate::value::Value;
use std::fmt;
use std::sync::Arc;

/// Custom clone hook: receives the value being cloned and whether the copy
/// should be recursive.
pub type CloneHook = Arc<dyn Fn(&Value, bool) -> Value + Send + Sync>;

/// Body of a callable value.
pub type NativeFn = Arc<dyn Fn(&[Value]) -> Value + Send + Sync>;

/// Behavior shared by a family of records.
///
/// A template supplies inherited properties (read when a record has no own
/// property of that name) and optionally a custom clone hook.
pub struct Template {
    name: String,
    defaults: Fields,
    clone_hook: Option<CloneHook>,
}

impl Template {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            defaults: Fields::new(),
            clone_hook: None,
        }
    }

    /// Add an inherited property.
    pub fn with_default(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.defaults.insert(key, value.into());
        self
    }

    /// Install a clone hook used by [`deep_clone`](crate::deep_clone).
    pub fn with_clone_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Value, bool) -> Value + Send + Sync + 'static,
    {
        self.clone_hook = Some(Arc::new(hook));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn defaults(&self) -> &Fields {
        &self.defaults
    }

    pub fn clone_hook(&self) -> Option<&CloneHook> {
        self.clone_hook.as_ref()
    }

    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}

impl fmt::Debug for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Template")
            .field("name", &self.name)
            .field("defaults", &self.defaults)
            .field("clone_hook", &self.clone_hook.is_some())
            .finish()
    }
}

/// A record: ordered own properties plus an optional shared template.
#[derive(Clone, Debug, Default)]
pub struct Record {
    template: Option<Arc<Template>>,
    fields: Fields,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_template(template: Arc<Template>) -> Self {
        Self {
            template: Some(template),
            fields: Fields::new(),
        }
    }

    pub(crate) fn from_parts(template: Option<Arc<Template>>, fields: Fields) -> Self {
        Self { template, fields }
    }

    /// Builder-style variant of [`Record::insert`].
    pub fn field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key, value.into());
        self
    }

    pub fn template(&self) -> Option<&Arc<Template>> {
        self.template.as_ref()
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    /// Read an own property, falling back to the template's defaults.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields
            .get(key)
            .or_else(|| self.template.as_ref()?.defaults().get(key))
    }

    pub fn get_own(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn has_own(&self, key: &str) -> bool {
        self.fields.contains(key)
    }

    pub fn is_inherited(&self, key: &str) -> bool {
        !self.fields.contains(key)
            && self
                .template
                .as_ref()
                .is_some_and(|t| t.defaults().contains(key))
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.fields.insert(key, value)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.fields.remove(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A callable value carrying its own properties.
#[derive(Clone)]
pub struct Function {
    name: String,
    body: NativeFn,
    properties: Fields,
}

impl Function {
    pub fn new<F>(name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&[Value]) -> Value + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            body: Arc::new(body),
            properties: Fields::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn body(&self) -> &NativeFn {
        &self.body
    }

    pub fn properties(&self) -> &Fields {
        &self.properties
    }

    pub fn properties_mut(&mut self) -> &mut Fields {
        &mut self.properties
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.name)
            .field("properties", &self.properties)
            .finish()
    }
}
