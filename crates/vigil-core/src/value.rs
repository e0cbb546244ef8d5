//! Dynamic value model.
//!
//! A [`Value`] is either a scalar (copied by value) or a composite whose
//! payload lives behind a shared handle. Cloning a composite `Value` clones
//! the handle, so every clone observes and mutates the same structure. Use
//! [`deep_clone`](crate::deep_clone) for an independent copy.

use crate::collections::{ValueMap, ValueSet};
use crate::fields::Fields;
use crate::record::{Function, Record};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::sync::Arc;

/// Shared, lockable payload of a composite value.
pub type Shared<T> = Arc<RwLock<T>>;

/// A value that can be observed by a monitor.
#[derive(Clone, Debug, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    /// Calendar timestamp, copied by value.
    Timestamp(DateTime<Utc>),
    Record(Shared<Record>),
    Sequence(Shared<Vec<Value>>),
    Set(Shared<ValueSet>),
    Map(Shared<ValueMap>),
    Function(Shared<Function>),
}

fn share<T>(payload: T) -> Shared<T> {
    Arc::new(RwLock::new(payload))
}

impl Value {
    pub fn record(record: Record) -> Self {
        Value::Record(share(record))
    }

    pub fn sequence(items: Vec<Value>) -> Self {
        Value::Sequence(share(items))
    }

    pub fn set(set: ValueSet) -> Self {
        Value::Set(share(set))
    }

    pub fn map(map: ValueMap) -> Self {
        Value::Map(share(map))
    }

    pub fn function(function: Function) -> Self {
        Value::Function(share(function))
    }

    /// Name of the variant, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Timestamp(_) => "timestamp",
            Value::Record(_) => "record",
            Value::Sequence(_) => "sequence",
            Value::Set(_) => "set",
            Value::Map(_) => "map",
            Value::Function(_) => "function",
        }
    }

    /// True for values with properties of their own (records, sequences,
    /// sets, maps and functions).
    pub fn is_composite(&self) -> bool {
        matches!(
            self,
            Value::Record(_) | Value::Sequence(_) | Value::Set(_) | Value::Map(_) | Value::Function(_)
        )
    }

    pub fn is_sequence(&self) -> bool {
        matches!(self, Value::Sequence(_))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::Timestamp(t) => Some(*t),
            _ => None,
        }
    }

    /// True when both values refer to the same composite payload.
    pub fn ptr_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Record(a), Value::Record(b)) => Arc::ptr_eq(a, b),
            (Value::Sequence(a), Value::Sequence(b)) => Arc::ptr_eq(a, b),
            (Value::Set(a), Value::Set(b)) => Arc::ptr_eq(a, b),
            (Value::Map(a), Value::Map(b)) => Arc::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Strict equality: scalars by value, composites by identity.
    ///
    /// Integers and floats compare numerically; `NaN` equals nothing.
    pub fn strict_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => *a as f64 == *b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Timestamp(a), Value::Timestamp(b)) => a == b,
            _ => self.ptr_eq(other),
        }
    }

    /// Structural equality, descending into composites.
    ///
    /// Records must share the same template (or both have none) and the same
    /// own properties regardless of order. Functions compare by identity.
    pub fn deep_eq(&self, other: &Value) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        match (self, other) {
            (Value::Record(a), Value::Record(b)) => {
                let (a, b) = (a.read(), b.read());
                let same_template = match (a.template(), b.template()) {
                    (Some(x), Some(y)) => Arc::ptr_eq(x, y),
                    (None, None) => true,
                    _ => false,
                };
                same_template && fields_deep_eq(a.fields(), b.fields())
            }
            (Value::Sequence(a), Value::Sequence(b)) => {
                let (a, b) = (a.read(), b.read());
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.deep_eq(y))
            }
            (Value::Set(a), Value::Set(b)) => {
                let (a, b) = (a.read(), b.read());
                a.len() == b.len() && a.iter().all(|x| b.iter().any(|y| x.deep_eq(y)))
            }
            (Value::Map(a), Value::Map(b)) => {
                let (a, b) = (a.read(), b.read());
                a.len() == b.len()
                    && a.iter().all(|(ka, va)| {
                        b.iter().any(|(kb, vb)| ka.deep_eq(kb) && va.deep_eq(vb))
                    })
            }
            _ => self.strict_eq(other),
        }
    }

    /// Invoke a function value. Non-callable values yield `None`.
    pub fn call(&self, args: &[Value]) -> Option<Value> {
        match self {
            Value::Function(function) => {
                let body = function.read().body().clone();
                Some(body(args))
            }
            _ => None,
        }
    }

    /// Build a value from JSON: objects become records, arrays sequences.
    pub fn from_json(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::String(s.clone()),
            serde_json::Value::Array(items) => {
                Value::sequence(items.iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(map) => {
                let fields: Fields = map
                    .iter()
                    .map(|(k, v)| (k.clone(), Value::from_json(v)))
                    .collect();
                Value::record(Record::from_parts(None, fields))
            }
        }
    }

    /// Render as JSON.
    ///
    /// Records contribute their own properties only. Sets become arrays,
    /// maps become arrays of `[key, value]` pairs, timestamps RFC 3339
    /// strings, functions and non-finite floats `null`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::Value::Number((*i).into()),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Timestamp(t) => serde_json::Value::String(t.to_rfc3339()),
            Value::Record(record) => {
                let record = record.read();
                let map = record
                    .fields()
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect();
                serde_json::Value::Object(map)
            }
            Value::Sequence(items) => {
                serde_json::Value::Array(items.read().iter().map(Value::to_json).collect())
            }
            Value::Set(set) => {
                serde_json::Value::Array(set.read().iter().map(Value::to_json).collect())
            }
            Value::Map(map) => serde_json::Value::Array(
                map.read()
                    .iter()
                    .map(|(k, v)| serde_json::Value::Array(vec![k.to_json(), v.to_json()]))
                    .collect(),
            ),
            Value::Function(_) => serde_json::Value::Null,
        }
    }
}

fn fields_deep_eq(a: &Fields, b: &Fields) -> bool {
    a.len() == b.len()
        && a
            .iter()
            .all(|(key, value)| b.get(key).is_some_and(|other| value.deep_eq(other)))
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let json = serde_json::Value::deserialize(deserializer)?;
        Ok(Value::from_json(&json))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i.into())
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<usize> for Value {
    fn from(i: usize) -> Self {
        i64::try_from(i)
            .map(Value::Int)
            .unwrap_or(Value::Float(i as f64))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(t: DateTime<Utc>) -> Self {
        Value::Timestamp(t)
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Value::record(record)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::sequence(items)
    }
}

impl From<ValueSet> for Value {
    fn from(set: ValueSet) -> Self {
        Value::set(set)
    }
}

impl From<ValueMap> for Value {
    fn from(map: ValueMap) -> Self {
        Value::map(map)
    }
}

impl From<Function> for Value {
    fn from(function: Function) -> Self {
        Value::function(function)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        Value::from_json(&json)
    }
}
