//! Collecting key-value pairs into insertion-ordered maps.

use std::hash::Hash;

use indexmap::IndexMap;

/// Collect pairs into a map, storing `f(&key, value)` for each pair.
///
/// A repeated key overwrites the earlier value but keeps the position of its
/// first occurrence.
pub fn collect_map<K, V, U, I, F>(pairs: I, mut f: F) -> IndexMap<K, U>
where
    I: IntoIterator<Item = (K, V)>,
    K: Hash + Eq,
    F: FnMut(&K, V) -> U,
{
    let mut map = IndexMap::new();
    for (key, value) in pairs {
        let value = f(&key, value);
        map.insert(key, value);
    }
    map
}

/// Collect pairs into a map from each key to all of its values, in input
/// order.
pub fn collect_multi_map<K, V, I>(pairs: I) -> IndexMap<K, Vec<V>>
where
    I: IntoIterator<Item = (K, V)>,
    K: Hash + Eq,
{
    let mut map: IndexMap<K, Vec<V>> = IndexMap::new();
    for (key, value) in pairs {
        map.entry(key).or_default().push(value);
    }
    map
}
