//! Structural cloning of composite values.

use crate::collections::{ValueMap, ValueSet};
use crate::fields::Fields;
use crate::path::CONTEXT_KEY;
use crate::record::Record;
use crate::value::Value;

/// Own keys that mark a record as carrying an injected template payload.
const POLLUTION_KEYS: [&str; 2] = ["constructor", "__proto__"];

/// Own keys never copied into a clone.
const EXCLUDED_KEYS: [&str; 4] = ["constructor", "prototype", "__proto__", CONTEXT_KEY];

/// Deep-copy a value.
///
/// Rules, first match wins:
/// 1. scalars (timestamps included) are returned as they are;
/// 2. a record whose template has a clone hook delegates to the hook,
///    passing `recursive` through;
/// 3. sets, maps and sequences are rebuilt, cloning members when
///    `recursive` is set (map keys are kept);
/// 4. records are rebuilt on the same template, unless they carry their own
///    `constructor` or `__proto__` key, in which case the clone has no
///    template at all. Keys listed in the exclusion list are dropped.
///
/// Functions are shared, not copied. The value graph must be acyclic.
pub fn deep_clone(value: &Value, recursive: bool) -> Value {
    let member = |v: &Value| {
        if recursive {
            deep_clone(v, true)
        } else {
            v.clone()
        }
    };

    match value {
        Value::Record(record) => {
            let hook = record
                .read()
                .template()
                .and_then(|t| t.clone_hook().cloned());
            if let Some(hook) = hook {
                return hook(value, recursive);
            }

            let (template, entries) = {
                let source = record.read();
                let polluted = POLLUTION_KEYS.iter().any(|k| source.has_own(k));
                let template = if polluted {
                    None
                } else {
                    source.template().cloned()
                };
                let entries: Vec<(String, Value)> = source
                    .fields()
                    .iter()
                    .filter(|(k, _)| !EXCLUDED_KEYS.contains(&k.as_str()))
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect();
                (template, entries)
            };

            let fields: Fields = entries.iter().map(|(k, v)| (k.clone(), member(v))).collect();
            Value::record(Record::from_parts(template, fields))
        }
        Value::Sequence(items) => {
            let items = items.read().clone();
            Value::sequence(items.iter().map(member).collect())
        }
        Value::Set(set) => {
            let members: Vec<Value> = set.read().iter().cloned().collect();
            Value::set(members.iter().map(member).collect::<ValueSet>())
        }
        Value::Map(map) => {
            let entries: Vec<(Value, Value)> =
                map.read().iter().map(|(k, v)| (k.clone(), v.clone())).collect();
            Value::map(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), member(v)))
                    .collect::<ValueMap>(),
            )
        }
        scalar_or_function => scalar_or_function.clone(),
    }
}
