//! Test utilities for the push crate.
//!
//! Shared by unit tests (in `src/`) and integration tests (in `tests/`).
//! Only compiled for tests or with the `test-support` feature.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, Local, TimeDelta, Utc};
use mockable::Clock;

use crate::domain::ports::{
    KeyValueStore, KeyValueStoreError, NotificationPresenter, NotificationPresenterError,
};
use crate::domain::{LocalNotificationRequest, NotificationChannel};
use crate::outbound::kv::InMemoryKeyValueStore;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Clock frozen at a settable instant.
#[derive(Debug)]
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    /// Freeze the clock at `now`.
    #[must_use]
    pub const fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    /// Move the clock forward by `millis` milliseconds.
    pub fn advance_millis(&self, millis: i64) {
        *lock(&self.0) += TimeDelta::milliseconds(millis);
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *lock(&self.0)
    }
}

/// In-memory store whose reads and writes can be made to fail on demand.
#[derive(Debug, Default)]
pub struct FlakyKeyValueStore {
    inner: InMemoryKeyValueStore,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl FlakyKeyValueStore {
    /// Make every subsequent `get` fail (or succeed again).
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent `set` and `remove` fail (or succeed again).
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Seed an entry, bypassing failure injection.
    pub fn set_raw(&self, key: &str, value: &str) {
        self.inner.insert(key, value);
    }

    /// Copy of every stored entry.
    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.inner.snapshot()
    }
}

#[async_trait]
impl KeyValueStore for FlakyKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, KeyValueStoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(KeyValueStoreError::read(key, "injected read failure"));
        }
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), KeyValueStoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(KeyValueStoreError::write(key, "injected write failure"));
        }
        self.inner.set(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<(), KeyValueStoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(KeyValueStoreError::write(key, "injected write failure"));
        }
        self.inner.remove(key).await
    }
}

/// Presenter that records every channel and display request.
#[derive(Debug, Default)]
pub struct RecordingNotificationPresenter {
    channels: Mutex<Vec<NotificationChannel>>,
    displayed: Mutex<Vec<LocalNotificationRequest>>,
    fail_display: bool,
}

impl RecordingNotificationPresenter {
    /// Presenter whose `display` always fails.
    #[must_use]
    pub fn failing_display() -> Self {
        Self {
            fail_display: true,
            ..Self::default()
        }
    }

    /// Channels created so far.
    #[must_use]
    pub fn channels(&self) -> Vec<NotificationChannel> {
        lock(&self.channels).clone()
    }

    /// Notifications displayed so far.
    #[must_use]
    pub fn displayed(&self) -> Vec<LocalNotificationRequest> {
        lock(&self.displayed).clone()
    }
}

#[async_trait]
impl NotificationPresenter for RecordingNotificationPresenter {
    async fn create_channel(
        &self,
        channel: &NotificationChannel,
    ) -> Result<String, NotificationPresenterError> {
        lock(&self.channels).push(channel.clone());
        Ok(channel.id.clone())
    }

    async fn display(
        &self,
        request: &LocalNotificationRequest,
    ) -> Result<String, NotificationPresenterError> {
        if self.fail_display {
            return Err(NotificationPresenterError::display("injected display failure"));
        }
        lock(&self.displayed).push(request.clone());
        Ok(request.id.clone())
    }
}

/// Temporary store directory removed on drop.
#[derive(Debug)]
pub struct TempStoreDir {
    _guard: tempfile::TempDir,
    path: Utf8PathBuf,
}

impl TempStoreDir {
    /// Create a fresh directory.
    ///
    /// # Errors
    ///
    /// Returns an error when the directory cannot be created or its path is
    /// not UTF-8.
    pub fn new() -> std::io::Result<Self> {
        let guard = tempfile::tempdir()?;
        let path = Utf8PathBuf::from_path_buf(guard.path().join("store")).map_err(|path| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("non UTF-8 temp path: {}", path.display()),
            )
        })?;
        Ok(Self {
            _guard: guard,
            path,
        })
    }

    /// Store root inside the temporary directory; not created yet.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }
}
