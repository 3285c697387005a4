use std::collections::BTreeMap;

use tracing::trace;

/// A stored record: field names mapped to encoded field values.
pub type RawRecord = BTreeMap<String, String>;

/// Key-value storage for records.
///
/// A [`DataContext`][crate::DataContext] only talks to its store from
/// [`load()`][crate::DataContext::load] and [`save()`][crate::DataContext::save].
#[cfg_attr(test, mockall::automock)]
pub trait Store {
    /// The record stored under `key`.
    fn get(&self, key: &str) -> Option<RawRecord>;

    /// Stores `record` under `key`, replacing any previous record.
    fn put(&mut self, key: &str, record: RawRecord);

    /// Removes the record stored under `key`. Returns `false` if there was none.
    fn delete(&mut self, key: &str) -> bool;

    /// Every key with a stored record.
    fn keys(&self) -> Vec<String>;
}

/// A [`Store`] that keeps records in memory, ordered by key.
///
/// # Example
///
/// ```rust
/// use data_context::{MemoryStore, RawRecord, Store};
///
/// let mut store = MemoryStore::new();
/// store.put("k1", RawRecord::from([("title".to_string(), "Groceries".to_string())]));
///
/// assert_eq!(store.keys(), vec!["k1".to_string()]);
/// assert!(store.delete("k1"));
/// assert!(store.is_empty());
/// ```
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    records: BTreeMap<String, RawRecord>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Store for MemoryStore {
    fn get(&self, key: &str) -> Option<RawRecord> {
        self.records.get(key).cloned()
    }

    fn put(&mut self, key: &str, record: RawRecord) {
        trace!(key, fields = record.len(), "record stored");
        self.records.insert(key.to_string(), record);
    }

    fn delete(&mut self, key: &str) -> bool {
        self.records.remove(key).is_some()
    }

    fn keys(&self) -> Vec<String> {
        self.records.keys().cloned().collect()
    }
}

impl FromIterator<(String, RawRecord)> for MemoryStore {
    fn from_iter<I: IntoIterator<Item = (String, RawRecord)>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn record(title: &str) -> RawRecord {
        RawRecord::from([("title".to_string(), title.to_string())])
    }

    #[test]
    fn keys_come_back_sorted() {
        let mut store = MemoryStore::new();
        store.put("b", record("second"));
        store.put("a", record("first"));

        assert_eq!(store.keys(), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(store.get("a"), Some(record("first")));
    }

    #[test]
    fn put_replaces_and_delete_reports_presence() {
        let mut store = MemoryStore::from_iter([("a".to_string(), record("old"))]);

        store.put("a", record("new"));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("a"), Some(record("new")));

        assert!(store.delete("a"));
        assert!(!store.delete("a"));
        assert_eq!(store.get("a"), None);
    }
}
