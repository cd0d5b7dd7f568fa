//! Process-local key-value store.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::domain::ports::{KeyValueStore, KeyValueStoreError};

/// Mutex-guarded map implementing [`KeyValueStore`].
///
/// Contents vanish with the process, so this adapter only suits tests and
/// headless runs where every entry point shares one process.
#[derive(Debug, Default)]
pub struct InMemoryKeyValueStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl InMemoryKeyValueStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `entries`.
    pub fn with_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: Mutex::new(
                entries
                    .into_iter()
                    .map(|(key, value)| (key.into(), value.into()))
                    .collect(),
            ),
        }
    }

    /// Insert or replace an entry synchronously.
    pub fn insert(&self, key: impl Into<String>, value: impl Into<String>) {
        self.lock().insert(key.into(), value.into());
    }

    /// Copy of every stored entry.
    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.lock().clone()
    }

    // A panic while holding the lock cannot leave the map half-updated, so a
    // poisoned guard is still consistent.
    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl KeyValueStore for InMemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, KeyValueStoreError> {
        Ok(self.lock().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), KeyValueStoreError> {
        self.lock().insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), KeyValueStoreError> {
        self.lock().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_then_get_returns_latest_value() {
        let store = InMemoryKeyValueStore::new();
        store.set("k", "a").await.expect("set succeeds");
        store.set("k", "b").await.expect("set succeeds");

        assert_eq!(
            store.get("k").await.expect("get succeeds").as_deref(),
            Some("b")
        );
    }

    #[tokio::test]
    async fn remove_is_idempotent() {
        let store = InMemoryKeyValueStore::with_entries([("k", "v")]);
        store.remove("k").await.expect("remove succeeds");
        store.remove("k").await.expect("second remove succeeds");

        assert!(store.get("k").await.expect("get succeeds").is_none());
        assert!(store.snapshot().is_empty());
    }
}
