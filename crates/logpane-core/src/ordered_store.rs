//! OrderedStore: records kept sorted by a caller-supplied key, with a
//! direction that can be flipped without re-sorting.
//!
//! Backed by a `BTreeMap`, so insert is O(log n), an ordered snapshot is O(n)
//! and toggling direction only changes which end the snapshot walks from.
//!
//! Two records whose keys compare equal are the same entry as far as the
//! store is concerned: inserting the second one replaces the first. Callers
//! that need duplicates to coexist must fold a tiebreaker into the key.

use std::collections::BTreeMap;

pub struct OrderedStore<K, V> {
    records: BTreeMap<K, V>,
    key_fn: Box<dyn Fn(&V) -> K + Send + Sync>,
    ascending: bool,
}

impl<K: Ord, V: Clone> OrderedStore<K, V> {
    pub fn new(ascending: bool, key_fn: impl Fn(&V) -> K + Send + Sync + 'static) -> Self {
        Self {
            records: BTreeMap::new(),
            key_fn: Box::new(key_fn),
            ascending,
        }
    }

    /// Insert a record, replacing any record with an equal key. Returns the
    /// replaced record, if there was one.
    pub fn insert(&mut self, record: V) -> Option<V> {
        let key = (self.key_fn)(&record);
        self.records.insert(key, record)
    }

    pub fn extend(&mut self, records: impl IntoIterator<Item = V>) {
        for record in records {
            self.insert(record);
        }
    }

    pub fn remove_all(&mut self) {
        self.records.clear();
    }

    /// Clear the store and insert `records`.
    pub fn replace_all(&mut self, records: impl IntoIterator<Item = V>) {
        self.remove_all();
        self.extend(records);
    }

    /// Keep only the records for which `keep` holds.
    pub fn retain(&mut self, mut keep: impl FnMut(&V) -> bool) {
        self.records.retain(|_, v| keep(v));
    }

    /// All records in the active direction.
    pub fn ordered_snapshot(&self) -> Vec<V> {
        if self.ascending {
            self.records.values().cloned().collect()
        } else {
            self.records.values().rev().cloned().collect()
        }
    }

    pub fn toggle_direction(&mut self) {
        self.ascending = !self.ascending;
    }

    pub fn is_ascending(&self) -> bool {
        self.ascending
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
