//! Unique-value and associative collections keyed by strict equality.

use crate::value::Value;

/// A set of values; membership is decided by [`Value::strict_eq`].
#[derive(Clone, Debug, Default)]
pub struct ValueSet {
    members: Vec<Value>,
}

impl ValueSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a member. Returns false if an equal member was already present.
    pub fn insert(&mut self, value: Value) -> bool {
        if self.contains(&value) {
            return false;
        }
        self.members.push(value);
        true
    }

    pub fn contains(&self, value: &Value) -> bool {
        self.members.iter().any(|m| m.strict_eq(value))
    }

    pub fn remove(&mut self, value: &Value) -> bool {
        match self.members.iter().position(|m| m.strict_eq(value)) {
            Some(position) => {
                self.members.remove(position);
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Value> + '_ {
        self.members.iter()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl FromIterator<Value> for ValueSet {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        let mut set = ValueSet::new();
        for value in iter {
            set.insert(value);
        }
        set
    }
}

/// An ordered associative collection; keys are matched by [`Value::strict_eq`].
#[derive(Clone, Debug, Default)]
pub struct ValueMap {
    entries: Vec<(Value, Value)>,
}

impl ValueMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the value stored under `key`.
    pub fn insert(&mut self, key: Value, value: Value) -> Option<Value> {
        match self.entries.iter_mut().find(|(k, _)| k.strict_eq(&key)) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| k.strict_eq(key))
            .map(|(_, v)| v)
    }

    pub fn remove(&mut self, key: &Value) -> Option<Value> {
        let position = self.entries.iter().position(|(k, _)| k.strict_eq(key))?;
        Some(self.entries.remove(position).1)
    }

    pub fn keys(&self) -> impl Iterator<Item = &Value> + '_ {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> + '_ {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(Value, Value)> for ValueMap {
    fn from_iter<I: IntoIterator<Item = (Value, Value)>>(iter: I) -> Self {
        let mut map = ValueMap::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_rejects_duplicates() {
        let mut set = ValueSet::new();
        assert!(set.insert(Value::from("a")));
        assert!(!set.insert(Value::from("a")));
        assert!(set.insert(Value::Int(1)));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_set_membership_of_composites_is_by_identity() {
        let first = Value::sequence(vec![]);
        let second = Value::sequence(vec![]);
        let set: ValueSet = [first.clone(), second].into_iter().collect();

        assert_eq!(set.len(), 2);
        assert!(set.contains(&first));
    }

    #[test]
    fn test_map_replaces_by_key() {
        let mut map = ValueMap::new();
        map.insert(Value::from("k"), Value::Int(1));
        let previous = map.insert(Value::from("k"), Value::Int(2));

        assert!(previous.unwrap().strict_eq(&Value::Int(1)));
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(&Value::from("k")).and_then(Value::as_int), Some(2));
    }
}
