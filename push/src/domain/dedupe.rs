//! De-duplication gate for push deliveries.
//!
//! A delivered push is identified by `(type, dedupe value)`. The first
//! delivery writes a marker under `push_dedupe_<type>_<value>`; later
//! deliveries with the same pair find the marker and are suppressed. Markers
//! are never expired. Storage failures fail open: the push is shown rather
//! than silently dropped.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::domain::NotificationData;
use crate::domain::ports::KeyValueStore;

/// Prefix shared by every dedupe marker key.
pub const DEDUPE_KEY_PREFIX: &str = "push_dedupe_";

const SHOWN_MARKER: &str = "1";
const UNKNOWN_TYPE: &str = "unknown";

/// Storage key of a dedupe marker.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct DedupeStorageKey(String);

impl DedupeStorageKey {
    /// Derive the marker key, or `None` when the data has no dedupe value.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::collections::BTreeMap;
    /// use momtn_push::domain::{DedupeStorageKey, NotificationData};
    ///
    /// let mut raw = BTreeMap::new();
    /// raw.insert("photo_id".to_owned(), "p7".to_owned());
    /// let key = DedupeStorageKey::for_data(&NotificationData::from_map(&raw));
    /// assert_eq!(key.map(String::from).as_deref(), Some("push_dedupe_unknown_p7"));
    /// ```
    #[must_use]
    pub fn for_data(data: &NotificationData) -> Option<Self> {
        let value = data.dedupe_value()?;
        let kind = data.kind.as_deref().unwrap_or(UNKNOWN_TYPE);
        Some(Self(format!("{DEDUPE_KEY_PREFIX}{kind}_{value}")))
    }

    /// Borrow the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for DedupeStorageKey {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for DedupeStorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<DedupeStorageKey> for String {
    fn from(value: DedupeStorageKey) -> Self {
        value.0
    }
}

/// Outcome of running the gate for one delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DedupeDecision {
    /// No dedupe-eligible field; the store was not touched.
    Unkeyed,
    /// First delivery of this event; the marker has been written.
    FirstSeen(DedupeStorageKey),
    /// The event was already shown.
    Duplicate(DedupeStorageKey),
    /// The store failed; the delivery is treated as new.
    FailedOpen(DedupeStorageKey),
}

impl DedupeDecision {
    /// Whether the delivery must be dropped.
    #[must_use]
    pub const fn is_suppressed(&self) -> bool {
        matches!(self, Self::Duplicate(_))
    }

    /// Marker key involved in the decision, if any.
    #[must_use]
    pub const fn key(&self) -> Option<&DedupeStorageKey> {
        match self {
            Self::Unkeyed => None,
            Self::FirstSeen(key) | Self::Duplicate(key) | Self::FailedOpen(key) => Some(key),
        }
    }
}

/// Gate deciding whether a push already produced a visible notification.
#[derive(Clone)]
pub struct DedupeGate {
    store: Arc<dyn KeyValueStore>,
}

impl DedupeGate {
    /// Create a gate over the shared store.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Check the marker for `data` and write it on first delivery.
    pub async fn check(&self, data: &NotificationData) -> DedupeDecision {
        let Some(key) = DedupeStorageKey::for_data(data) else {
            debug!("push has no dedupe key; skipping de-duplication");
            return DedupeDecision::Unkeyed;
        };

        match self.store.get(key.as_str()).await {
            Ok(Some(_)) => {
                info!(dedupe_key = %key, "duplicate push suppressed");
                DedupeDecision::Duplicate(key)
            }
            Ok(None) => match self.store.set(key.as_str(), SHOWN_MARKER).await {
                Ok(()) => {
                    debug!(dedupe_key = %key, "push marked as shown");
                    DedupeDecision::FirstSeen(key)
                }
                Err(error) => {
                    warn!(dedupe_key = %key, error = %error, "failed to mark push as shown; failing open");
                    DedupeDecision::FailedOpen(key)
                }
            },
            Err(error) => {
                warn!(dedupe_key = %key, error = %error, "dedupe lookup failed; failing open");
                DedupeDecision::FailedOpen(key)
            }
        }
    }

    /// Whether the delivery described by `data` must be suppressed.
    ///
    /// Marks first deliveries as shown, like [`Self::check`].
    pub async fn should_suppress(&self, data: &NotificationData) -> bool {
        self.check(data).await.is_suppressed()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use rstest::{fixture, rstest};

    use super::*;
    use crate::domain::ports::{KeyValueStoreError, MockKeyValueStore};
    use crate::outbound::kv::InMemoryKeyValueStore;

    fn data(pairs: &[(&str, &str)]) -> NotificationData {
        let raw: BTreeMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        NotificationData::from_map(&raw)
    }

    #[fixture]
    fn store() -> Arc<InMemoryKeyValueStore> {
        Arc::new(InMemoryKeyValueStore::new())
    }

    #[rstest]
    #[tokio::test]
    async fn second_delivery_of_same_event_is_suppressed(store: Arc<InMemoryKeyValueStore>) {
        let gate = DedupeGate::new(store.clone());
        let first = data(&[("type", "comment"), ("photo_id", "p7"), ("title", "a")]);
        let second = data(&[("type", "comment"), ("photoId", "p7"), ("title", "b")]);

        assert!(!gate.should_suppress(&first).await);
        assert!(gate.should_suppress(&second).await);
        assert_eq!(
            store.snapshot().get("push_dedupe_comment_p7").map(String::as_str),
            Some("1")
        );
    }

    #[rstest]
    #[tokio::test]
    async fn different_types_do_not_collide(store: Arc<InMemoryKeyValueStore>) {
        let gate = DedupeGate::new(store);

        assert!(!gate.should_suppress(&data(&[("type", "comment"), ("photo_id", "p7")])).await);
        assert!(!gate.should_suppress(&data(&[("type", "like"), ("photo_id", "p7")])).await);
    }

    #[rstest]
    #[tokio::test]
    async fn missing_type_uses_unknown_segment(store: Arc<InMemoryKeyValueStore>) {
        let gate = DedupeGate::new(store);
        let decision = gate.check(&data(&[("notification_id", "n9")])).await;
        assert_eq!(
            decision.key().map(DedupeStorageKey::as_str),
            Some("push_dedupe_unknown_n9")
        );
    }

    #[tokio::test]
    async fn unkeyed_push_never_touches_the_store() {
        let mut store = MockKeyValueStore::new();
        store.expect_get().times(0);
        store.expect_set().times(0);

        let gate = DedupeGate::new(Arc::new(store));
        let decision = gate.check(&data(&[("type", "comment"), ("group_id", "g1")])).await;
        assert_eq!(decision, DedupeDecision::Unkeyed);
    }

    #[tokio::test]
    async fn read_failure_fails_open_without_writing() {
        let mut store = MockKeyValueStore::new();
        store
            .expect_get()
            .times(1)
            .returning(|key| Err(KeyValueStoreError::read(key, "disk unavailable")));
        store.expect_set().times(0);

        let gate = DedupeGate::new(Arc::new(store));
        let decision = gate.check(&data(&[("messageId", "m1")])).await;

        assert!(matches!(decision, DedupeDecision::FailedOpen(_)));
        assert!(!decision.is_suppressed());
    }

    #[tokio::test]
    async fn write_failure_fails_open() {
        let mut store = MockKeyValueStore::new();
        store.expect_get().times(1).returning(|_| Ok(None));
        store
            .expect_set()
            .withf(|key, value| key == "push_dedupe_unknown_m1" && value == "1")
            .times(1)
            .returning(|key, _| Err(KeyValueStoreError::write(key, "read-only")));

        let gate = DedupeGate::new(Arc::new(store));
        assert!(!gate.should_suppress(&data(&[("messageId", "m1")])).await);
    }
}
