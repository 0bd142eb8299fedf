//! Case-insensitive, insertion-ordered string map.
//!
//! Descriptor collections (properties, controller attributes, axis
//! attributes) require case-insensitive name uniqueness: `Velocity` and
//! `velocity` are the same key. `CaselessMap` normalizes the key case for
//! lookup and insertion while remembering the spelling of the most recent
//! insert, and iterates in insertion order.

use std::collections::HashMap;

/// A string-keyed map with case-insensitive lookup and insertion order.
#[derive(Debug, Clone)]
pub struct CaselessMap<V> {
    /// (original-cased key, value) pairs in insertion order.
    entries: Vec<(String, V)>,
    /// Lowercased key to slot in `entries`.
    index: HashMap<String, usize>,
}

impl<V> CaselessMap<V> {
    /// Create an empty map.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Insert a value, replacing any value stored under a caseless match.
    ///
    /// On replacement the new key spelling wins and the entry keeps its
    /// original insertion position. Returns the previous value if any.
    pub fn insert(&mut self, key: impl Into<String>, value: V) -> Option<V> {
        let key = key.into();
        let folded = key.to_lowercase();
        match self.index.get(&folded) {
            Some(&slot) => {
                let old = std::mem::replace(&mut self.entries[slot], (key, value));
                Some(old.1)
            }
            None => {
                self.index.insert(folded, self.entries.len());
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Look up a value by key, ignoring case.
    pub fn get(&self, key: &str) -> Option<&V> {
        self.index
            .get(&key.to_lowercase())
            .map(|&slot| &self.entries[slot].1)
    }

    /// Whether a caseless match for `key` exists.
    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(&key.to_lowercase())
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate `(key, value)` pairs in insertion order, keys as inserted.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterate keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Iterate values in insertion order.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.iter().map(|(_, v)| v)
    }
}

impl<V> Default for CaselessMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> FromIterator<(String, V)> for CaselessMap<V> {
    fn from_iter<I: IntoIterator<Item = (String, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caseless_lookup() {
        let mut map = CaselessMap::new();
        map.insert("Velocity", 1);

        assert_eq!(map.get("velocity"), Some(&1));
        assert_eq!(map.get("VELOCITY"), Some(&1));
        assert!(map.contains_key("veLOcity"));
        assert!(!map.contains_key("acceleration"));
    }

    #[test]
    fn test_caseless_replace_keeps_position_and_new_spelling() {
        let mut map = CaselessMap::new();
        map.insert("velocity", 1);
        map.insert("Acceleration", 2);
        let old = map.insert("Velocity", 3);

        assert_eq!(old, Some(1));
        assert_eq!(map.len(), 2);
        let keys: Vec<_> = map.keys().collect();
        assert_eq!(keys, vec!["Velocity", "Acceleration"]);
        assert_eq!(map.get("velocity"), Some(&3));
    }

    #[test]
    fn test_insertion_order() {
        let mut map = CaselessMap::new();
        map.insert("c", 3);
        map.insert("a", 1);
        map.insert("b", 2);

        let values: Vec<_> = map.values().copied().collect();
        assert_eq!(values, vec![3, 1, 2]);
    }
}
