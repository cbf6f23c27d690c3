//! Case-insensitive ordered map
//!
//! Keys are grouped by their lowercase form. Each group keeps one
//! representative spelling of the key, and iteration runs in ascending
//! order of the folded key, so output is deterministic for identical input.

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::btree_map::{self, BTreeMap};

/// Fold a key to the form used for comparison and ordering
fn fold(key: &str) -> String {
    key.to_lowercase()
}

/// Map whose keys compare case-insensitively
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseInsensitiveMap<V> {
    // folded key -> (representative key, value)
    entries: BTreeMap<String, (String, V)>,
}

impl<V> CaseInsensitiveMap<V> {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Insert a value, replacing the value of any case-variant key.
    ///
    /// The spelling of the first inserted key is kept as the representative.
    /// Returns the previous value, if any.
    pub fn insert(&mut self, key: impl Into<String>, value: V) -> Option<V> {
        let key = key.into();
        match self.entries.entry(fold(&key)) {
            btree_map::Entry::Occupied(mut slot) => {
                Some(std::mem::replace(&mut slot.get_mut().1, value))
            }
            btree_map::Entry::Vacant(slot) => {
                slot.insert((key, value));
                None
            }
        }
    }

    /// Insert only if no case-variant of `key` is present.
    ///
    /// Returns `true` when the entry was added.
    pub fn insert_if_absent(&mut self, key: impl Into<String>, value: V) -> bool {
        let key = key.into();
        match self.entries.entry(fold(&key)) {
            btree_map::Entry::Occupied(_) => false,
            btree_map::Entry::Vacant(slot) => {
                slot.insert((key, value));
                true
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.entries.get(&fold(key)).map(|(_, v)| v)
    }

    /// Look up an entry, returning the representative key with the value
    pub fn get_key_value(&self, key: &str) -> Option<(&str, &V)> {
        self.entries
            .get(&fold(key))
            .map(|(k, v)| (k.as_str(), v))
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(&fold(key))
    }

    pub fn remove(&mut self, key: &str) -> Option<V> {
        self.entries.remove(&fold(key)).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in ascending case-insensitive key order
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            inner: self.entries.values(),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.iter().map(|(_, v)| v)
    }
}

impl<V> Default for CaseInsensitiveMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Borrowing iterator over a [`CaseInsensitiveMap`]
pub struct Iter<'a, V> {
    inner: btree_map::Values<'a, String, (String, V)>,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (&'a str, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, v)| (k.as_str(), v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> {}

impl<'a, V> IntoIterator for &'a CaseInsensitiveMap<V> {
    type Item = (&'a str, &'a V);
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<V> IntoIterator for CaseInsensitiveMap<V> {
    type Item = (String, V);
    type IntoIter = btree_map::IntoValues<String, (String, V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_values()
    }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for CaseInsensitiveMap<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<K: Into<String>, V> Extend<(K, V)> for CaseInsensitiveMap<V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<V: Serialize> Serialize for CaseInsensitiveMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (k, v) in self {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}
