pub mod file;
pub mod repository;

use crate::error::StoreError;
use serde_json::Value;
use std::collections::HashMap;

pub use file::FileStore;
pub use repository::{Repository, SCAN_WINDOW_DAYS};

/// Flat key/value storage for JSON documents. Every record the notebook
/// keeps lives under one string key; the repository layer decides the keys.
pub trait KvStore {
    /// Fetch the value stored under `key`, `None` when absent
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    /// Store `value` under `key`, replacing any previous value
    fn set(&mut self, key: &str, value: Value) -> Result<(), StoreError>;

    /// Delete the value under `key`; deleting a missing key is not an error
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

/// In-memory store backed by a map of serialized JSON strings, with an
/// optional byte quota. Used by tests and import dry runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
    quota_bytes: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that rejects writes once keys plus serialized values would
    /// exceed `quota_bytes`.
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            entries: HashMap::new(),
            quota_bytes: Some(quota_bytes),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn used_bytes(&self) -> usize {
        self.entries.iter().map(|(k, v)| k.len() + v.len()).sum()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        match self.entries.get(key) {
            Some(text) => Ok(Some(serde_json::from_str(text)?)),
            None => Ok(None),
        }
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), StoreError> {
        let text = value.to_string();
        if let Some(quota) = self.quota_bytes {
            let replaced = self
                .entries
                .get(key)
                .map(|v| key.len() + v.len())
                .unwrap_or(0);
            if self.used_bytes() - replaced + key.len() + text.len() > quota {
                return Err(StoreError::QuotaExceeded {
                    key: key.to_string(),
                });
            }
        }
        self.entries.insert(key.to_string(), text);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_set_get_remove() {
        let mut store = MemoryStore::new();
        assert!(store.get("tasks_2024-01-15").unwrap().is_none());

        store.set("tasks_2024-01-15", json!([{"title": "晨跑"}])).unwrap();
        let value = store.get("tasks_2024-01-15").unwrap().unwrap();
        assert_eq!(value[0]["title"], "晨跑");

        store.remove("tasks_2024-01-15").unwrap();
        assert!(store.get("tasks_2024-01-15").unwrap().is_none());
        // Removing again is a no-op
        store.remove("tasks_2024-01-15").unwrap();
    }

    #[test]
    fn test_set_replaces_previous_value() {
        let mut store = MemoryStore::new();
        store.set("all_categories", json!(["开发"])).unwrap();
        store.set("all_categories", json!(["开发", "设计"])).unwrap();
        let value = store.get("all_categories").unwrap().unwrap();
        assert_eq!(value.as_array().unwrap().len(), 2);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_quota_rejects_oversized_write() {
        let mut store = MemoryStore::with_quota(32);
        store.set("a", json!("short")).unwrap();

        let err = store
            .set("b", json!("a much longer value that cannot fit"))
            .unwrap_err();
        assert!(matches!(err, StoreError::QuotaExceeded { ref key } if key == "b"));

        // The failed write left the store untouched
        assert!(store.get("b").unwrap().is_none());
        assert_eq!(store.get("a").unwrap().unwrap(), json!("short"));
    }

    #[test]
    fn test_quota_accounts_for_replacement() {
        let mut store = MemoryStore::with_quota(24);
        store.set("key", json!("0123456789")).unwrap();
        // Replacing the only entry frees its bytes first
        store.set("key", json!("9876543210")).unwrap();
        assert_eq!(store.get("key").unwrap().unwrap(), json!("9876543210"));
    }
}
