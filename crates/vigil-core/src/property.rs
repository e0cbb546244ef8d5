//! Name-based property access on composite values.
//!
//! Every composite exposes string-named properties:
//!
//! | Kind | Own properties | Inherited |
//! |------|----------------|-----------|
//! | record | its fields | template defaults |
//! | sequence | `"0"`..`"n-1"`, `"length"` | - |
//! | function | its properties | - |
//! | set, map | - | `"size"` (read-only) |

use crate::error::{CoreError, Result};
use crate::value::Value;

/// Name of the sequence length property.
pub const LENGTH: &str = "length";

/// Name of the read-only size property of sets and maps.
pub const SIZE: &str = "size";

/// Largest length of a sequence. Indices range up to `MAX_LENGTH - 1`.
pub const MAX_LENGTH: usize = u32::MAX as usize;

/// How a composite relates to a property name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ownership {
    /// Stored on the value itself.
    Owned,
    /// Provided by the value's template or kind, not stored on it.
    Inherited,
    /// Not present at all.
    Absent,
}

/// Parse a canonical sequence index: decimal digits without leading zeros,
/// below [`MAX_LENGTH`].
pub fn parse_index(name: &str) -> Option<usize> {
    if name.is_empty() || (name.len() > 1 && name.starts_with('0')) {
        return None;
    }
    if !name.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    name.parse::<usize>().ok().filter(|index| *index < MAX_LENGTH)
}

/// Parse a value assigned to a sequence's `"length"`: a non-negative whole
/// number up to [`MAX_LENGTH`].
pub fn parse_length(value: &Value) -> Result<usize> {
    match value {
        Value::Int(i) => usize::try_from(*i)
            .ok()
            .filter(|length| *length <= MAX_LENGTH)
            .ok_or_else(|| CoreError::InvalidLength(i.to_string())),
        Value::Float(f) if f.fract() == 0.0 && *f >= 0.0 && *f <= MAX_LENGTH as f64 => {
            Ok(*f as usize)
        }
        other => Err(CoreError::InvalidLength(format!("{:?}", other))),
    }
}

/// Truncate or pad `items` with `Null` to `length`, failing instead of
/// aborting when the padding cannot be allocated.
fn resize(items: &mut Vec<Value>, length: usize) -> Result<()> {
    if let Some(additional) = length.checked_sub(items.len()) {
        items
            .try_reserve(additional)
            .map_err(|_| CoreError::InvalidLength(length.to_string()))?;
    }
    items.resize(length, Value::Null);
    Ok(())
}

impl Value {
    /// Classify `name` relative to this value. Scalars own nothing.
    pub fn ownership(&self, name: &str) -> Ownership {
        match self {
            Value::Record(record) => {
                let record = record.read();
                if record.has_own(name) {
                    Ownership::Owned
                } else if record.is_inherited(name) {
                    Ownership::Inherited
                } else {
                    Ownership::Absent
                }
            }
            Value::Sequence(items) => {
                if name == LENGTH {
                    return Ownership::Owned;
                }
                match parse_index(name) {
                    Some(index) if index < items.read().len() => Ownership::Owned,
                    _ => Ownership::Absent,
                }
            }
            Value::Function(function) => {
                if function.read().properties().contains(name) {
                    Ownership::Owned
                } else {
                    Ownership::Absent
                }
            }
            Value::Set(_) | Value::Map(_) if name == SIZE => Ownership::Inherited,
            _ => Ownership::Absent,
        }
    }

    /// Read a property, own or inherited.
    pub fn get_property(&self, name: &str) -> Option<Value> {
        match self {
            Value::Record(record) => record.read().get(name).cloned(),
            Value::Sequence(items) => {
                let items = items.read();
                if name == LENGTH {
                    return Some(Value::from(items.len()));
                }
                items.get(parse_index(name)?).cloned()
            }
            Value::Function(function) => function.read().properties().get(name).cloned(),
            Value::Set(set) if name == SIZE => Some(Value::from(set.read().len())),
            Value::Map(map) if name == SIZE => Some(Value::from(map.read().len())),
            _ => None,
        }
    }

    /// Check that `value` could be stored under `name` without touching
    /// anything.
    pub fn check_assignable(&self, name: &str, value: &Value) -> Result<()> {
        match self {
            Value::Record(_) | Value::Function(_) => Ok(()),
            Value::Sequence(_) if name == LENGTH => parse_length(value).map(|_| ()),
            Value::Sequence(_) => parse_index(name)
                .map(|_| ())
                .ok_or_else(|| CoreError::NotAnIndex(name.to_string())),
            Value::Set(_) | Value::Map(_) => Err(CoreError::ReadOnlyProperty(name.to_string())),
            other => Err(CoreError::NotComposite(other.type_name())),
        }
    }

    /// Store `value` under `name`.
    ///
    /// Writing a sequence index past the end pads with `Null`; writing
    /// `"length"` truncates or pads.
    pub fn set_property(&self, name: &str, value: Value) -> Result<()> {
        match self {
            Value::Record(record) => {
                record.write().insert(name, value);
            }
            Value::Function(function) => {
                function.write().properties_mut().insert(name, value);
            }
            Value::Sequence(items) if name == LENGTH => {
                let length = parse_length(&value)?;
                resize(&mut items.write(), length)?;
            }
            Value::Sequence(items) => {
                let index =
                    parse_index(name).ok_or_else(|| CoreError::NotAnIndex(name.to_string()))?;
                let mut items = items.write();
                if index >= items.len() {
                    resize(&mut items, index + 1)?;
                }
                items[index] = value;
            }
            Value::Set(_) | Value::Map(_) => {
                return Err(CoreError::ReadOnlyProperty(name.to_string()))
            }
            other => return Err(CoreError::NotComposite(other.type_name())),
        }
        Ok(())
    }

    /// Remove an own property.
    ///
    /// Removing the trailing element of a sequence shortens it; removing an
    /// inner element leaves `Null` in its place. Missing properties are
    /// ignored.
    pub fn remove_property(&self, name: &str) -> Result<()> {
        match self {
            Value::Record(record) => {
                record.write().remove(name);
            }
            Value::Function(function) => {
                function.write().properties_mut().remove(name);
            }
            Value::Sequence(items) => {
                let index = parse_index(name).ok_or_else(|| CoreError::NotAnIndex(name.to_string()))?;
                let mut items = items.write();
                if items.len().checked_sub(1) == Some(index) {
                    items.pop();
                } else if index < items.len() {
                    items[index] = Value::Null;
                }
            }
            Value::Set(_) | Value::Map(_) => {
                return Err(CoreError::ReadOnlyProperty(name.to_string()))
            }
            other => return Err(CoreError::NotComposite(other.type_name())),
        }
        Ok(())
    }

    /// Names of own properties, in order. Sequences list their indices.
    pub fn property_names(&self) -> Vec<String> {
        match self {
            Value::Record(record) => record.read().fields().keys().cloned().collect(),
            Value::Sequence(items) => (0..items.read().len()).map(|i| i.to_string()).collect(),
            Value::Function(function) => function.read().properties().keys().cloned().collect(),
            _ => Vec::new(),
        }
    }

    /// Number of elements of a sequence.
    pub fn sequence_len(&self) -> Option<usize> {
        match self {
            Value::Sequence(items) => Some(items.read().len()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Record, Template};
    use crate::ValueSet;
    use serde_json::json;

    #[test]
    fn test_parse_index() {
        assert_eq!(parse_index("0"), Some(0));
        assert_eq!(parse_index("12"), Some(12));
        assert_eq!(parse_index("01"), None);
        assert_eq!(parse_index("-1"), None);
        assert_eq!(parse_index("length"), None);
        assert_eq!(parse_index(""), None);
        assert_eq!(parse_index("4294967294"), Some(MAX_LENGTH - 1));
        assert_eq!(parse_index("4294967295"), None);
        assert_eq!(parse_index("18446744073709551615"), None);
        assert_eq!(parse_index("99999999999999999999999"), None);
    }

    #[test]
    fn test_parse_length_bounds() {
        assert_eq!(parse_length(&Value::Int(0)), Ok(0));
        assert_eq!(parse_length(&Value::Int(u32::MAX as i64)), Ok(MAX_LENGTH));
        assert_eq!(parse_length(&Value::Float(3.0)), Ok(3));

        for invalid in [
            Value::Int(-1),
            Value::Int(u32::MAX as i64 + 1),
            Value::Int(i64::MAX),
            Value::Float(4294967296.0),
            Value::Float(1.5),
            Value::Float(f64::NAN),
            Value::from("3"),
        ] {
            assert!(matches!(parse_length(&invalid), Err(CoreError::InvalidLength(_))));
        }
    }

    #[test]
    fn test_out_of_range_sequence_writes_fail() {
        let value = Value::from(json!(["a"]));

        assert!(matches!(
            value.set_property("18446744073709551615", Value::Int(1)),
            Err(CoreError::NotAnIndex(_))
        ));
        assert!(matches!(
            value.set_property("4294967295", Value::Int(1)),
            Err(CoreError::NotAnIndex(_))
        ));
        assert!(matches!(
            value.set_property(LENGTH, Value::Int(i64::MAX)),
            Err(CoreError::InvalidLength(_))
        ));
        assert!(matches!(
            value.check_assignable(LENGTH, &Value::Int(i64::MAX)),
            Err(CoreError::InvalidLength(_))
        ));
        assert!(matches!(
            value.remove_property("18446744073709551615"),
            Err(CoreError::NotAnIndex(_))
        ));
        assert_eq!(value.to_json(), json!(["a"]));
    }

    #[test]
    fn test_record_ownership() {
        let template = Template::new("Base").with_default("inherited", 1).into_shared();
        let value = Value::record(Record::with_template(template).field("own", 2));

        assert_eq!(value.ownership("own"), Ownership::Owned);
        assert_eq!(value.ownership("inherited"), Ownership::Inherited);
        assert_eq!(value.ownership("missing"), Ownership::Absent);
        assert_eq!(value.get_property("inherited").and_then(|v| v.as_int()), Some(1));
    }

    #[test]
    fn test_sequence_properties() {
        let value = Value::from(json!(["a", "b"]));

        assert_eq!(value.ownership("1"), Ownership::Owned);
        assert_eq!(value.ownership("2"), Ownership::Absent);
        assert_eq!(value.ownership(LENGTH), Ownership::Owned);
        assert_eq!(value.get_property(LENGTH).and_then(|v| v.as_int()), Some(2));

        value.set_property("3", Value::from("d")).unwrap();
        assert_eq!(value.to_json(), json!(["a", "b", null, "d"]));

        value.set_property(LENGTH, Value::Int(1)).unwrap();
        assert_eq!(value.to_json(), json!(["a"]));

        assert!(matches!(
            value.set_property("name", Value::Null),
            Err(CoreError::NotAnIndex(_))
        ));
        assert!(matches!(
            value.set_property(LENGTH, Value::Int(-1)),
            Err(CoreError::InvalidLength(_))
        ));
    }

    #[test]
    fn test_remove_trailing_element_shortens_sequence() {
        let value = Value::from(json!(["a", "b", "c"]));

        value.remove_property("1").unwrap();
        assert_eq!(value.to_json(), json!(["a", null, "c"]));

        value.remove_property("2").unwrap();
        assert_eq!(value.to_json(), json!(["a", null]));

        value.remove_property("7").unwrap();
        assert_eq!(value.sequence_len(), Some(2));
    }

    #[test]
    fn test_set_is_read_only() {
        let value = Value::set([Value::Int(1)].into_iter().collect::<ValueSet>());

        assert_eq!(value.ownership(SIZE), Ownership::Inherited);
        assert_eq!(value.get_property(SIZE).and_then(|v| v.as_int()), Some(1));
        assert!(matches!(
            value.set_property(SIZE, Value::Int(3)),
            Err(CoreError::ReadOnlyProperty(_))
        ));
    }

    #[test]
    fn test_scalars_have_no_properties() {
        assert!(Value::Int(3).get_property("x").is_none());
        assert!(matches!(
            Value::Int(3).set_property("x", Value::Null),
            Err(CoreError::NotComposite("int"))
        ));
    }
}
