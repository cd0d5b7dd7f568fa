//! Port abstraction for the durable string key-value store.
//!
//! The [`KeyValueStore`] trait is the only synchronization point between the
//! background delivery handler, the notification interaction handler, and the
//! cold-start consumer. Those may run in different process lifetimes, so
//! adapters must persist writes beyond the current process. Only single-key
//! atomicity is expected.

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors raised by key-value store adapters.
    pub enum KeyValueStoreError {
        /// The backing store could not be opened or reached.
        Unavailable { message: String } => "key-value store unavailable: {message}",
        /// Reading a key failed.
        Read { key: String, message: String } => "key-value store read of '{key}' failed: {message}",
        /// Writing or removing a key failed.
        Write { key: String, message: String } => "key-value store write of '{key}' failed: {message}",
    }
}

/// Port for durable, process-surviving string storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// Returns `Ok(None)` when the key has never been written or has been
    /// removed.
    async fn get(&self, key: &str) -> Result<Option<String>, KeyValueStoreError>;

    /// Store `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<(), KeyValueStoreError>;

    /// Remove `key`. Removing an absent key succeeds.
    async fn remove(&self, key: &str) -> Result<(), KeyValueStoreError>;
}

/// Fixture implementation for tests that do not exercise persistence.
///
/// Every read misses and every write is discarded, so the pipeline behaves
/// as if each delivery were the first one seen.
#[derive(Debug, Default)]
pub struct FixtureKeyValueStore;

#[async_trait]
impl KeyValueStore for FixtureKeyValueStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, KeyValueStoreError> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: &str) -> Result<(), KeyValueStoreError> {
        Ok(())
    }

    async fn remove(&self, _key: &str) -> Result<(), KeyValueStoreError> {
        Ok(())
    }
}
