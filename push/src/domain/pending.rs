//! Pending-navigation record handed from push handling to app start-up.
//!
//! One slot, `pending_notification_data`, holds the most recent unconsumed
//! navigation target. Every qualifying event overwrites it; the next launch
//! reads and clears it via [`PendingNavigationRecorder::take_pending`].

use std::sync::Arc;

use mockable::Clock;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::domain::NotificationData;
use crate::domain::ports::{KeyValueStore, KeyValueStoreError};

/// Storage key of the pending-navigation slot.
pub const PENDING_NOTIFICATION_KEY: &str = "pending_notification_data";

/// Persisted navigation target awaiting the next app launch.
///
/// Absent fields are omitted from the stored JSON. The `type` and
/// `messageId` spellings are part of the stored format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingNotification {
    /// Group identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    /// Notification type.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Server-side notification identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification_id: Option<String>,
    /// Message identifier.
    #[serde(rename = "messageId", default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    /// Photo identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_id: Option<String>,
    /// Comment identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment_id: Option<String>,
    /// Parent comment identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_comment_id: Option<String>,
    /// Wall-clock time of the write, in milliseconds since the Unix epoch.
    pub timestamp: i64,
}

impl PendingNotification {
    /// Build a record from canonical data stamped with `timestamp`.
    #[must_use]
    pub fn from_data(data: &NotificationData, timestamp: i64) -> Self {
        Self {
            group_id: data.group_id.clone(),
            kind: data.kind.clone(),
            notification_id: data.notification_id.clone(),
            message_id: data.message_id.clone(),
            photo_id: data.photo_id.clone(),
            comment_id: data.comment_id.clone(),
            parent_comment_id: data.parent_comment_id.clone(),
            timestamp,
        }
    }

    /// Screen the app should open for this record.
    ///
    /// A photo target wins over a bare group target.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::collections::BTreeMap;
    /// use momtn_push::domain::{NavigationTarget, NotificationData, PendingNotification};
    ///
    /// let mut raw = BTreeMap::new();
    /// raw.insert("group_id".to_owned(), "g1".to_owned());
    /// let record = PendingNotification::from_data(&NotificationData::from_map(&raw), 0);
    /// assert_eq!(
    ///     record.navigation_target(),
    ///     Some(NavigationTarget::Group { group_id: "g1".to_owned() })
    /// );
    /// ```
    #[must_use]
    pub fn navigation_target(&self) -> Option<NavigationTarget> {
        if let Some(photo_id) = &self.photo_id {
            return Some(NavigationTarget::Photo {
                group_id: self.group_id.clone(),
                photo_id: photo_id.clone(),
                comment_id: self.comment_id.clone(),
            });
        }
        self.group_id
            .as_ref()
            .map(|group_id| NavigationTarget::Group {
                group_id: group_id.clone(),
            })
    }
}

/// In-app destination derived from a pending record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "screen", rename_all = "snake_case")]
pub enum NavigationTarget {
    /// A single photo, optionally scrolled to a comment.
    Photo {
        /// Owning group, when known.
        group_id: Option<String>,
        /// Photo to open.
        photo_id: String,
        /// Comment to highlight.
        comment_id: Option<String>,
    },
    /// A group feed.
    Group {
        /// Group to open.
        group_id: String,
    },
}

/// Errors raised while reading or writing the pending slot.
#[derive(Debug, Error)]
pub enum PendingNotificationError {
    /// The key-value store failed.
    #[error("pending notification store access failed: {0}")]
    Store(#[from] KeyValueStoreError),
    /// The record could not be encoded.
    #[error("failed to encode pending notification: {0}")]
    Encode(#[source] serde_json::Error),
    /// The stored record is not valid JSON for the expected shape.
    #[error("pending notification record is corrupt: {0}")]
    Corrupt(#[source] serde_json::Error),
}

/// Reads and writes the single pending-navigation slot.
#[derive(Clone)]
pub struct PendingNavigationRecorder {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
}

impl PendingNavigationRecorder {
    /// Create a recorder over the shared store, stamping writes with `clock`.
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Overwrite the pending slot with a record built from `data`.
    ///
    /// # Errors
    ///
    /// Returns [`PendingNotificationError`] when encoding or the store write
    /// fails; any previous record is then left intact.
    pub async fn record_pending(
        &self,
        data: &NotificationData,
    ) -> Result<PendingNotification, PendingNotificationError> {
        let record = PendingNotification::from_data(data, self.clock.utc().timestamp_millis());
        let encoded = serde_json::to_string(&record).map_err(PendingNotificationError::Encode)?;
        self.store.set(PENDING_NOTIFICATION_KEY, &encoded).await?;
        info!(
            group_id = record.group_id.as_deref().unwrap_or_default(),
            photo_id = record.photo_id.as_deref().unwrap_or_default(),
            timestamp = record.timestamp,
            "pending notification recorded"
        );
        Ok(record)
    }

    /// Read the pending record without clearing it.
    ///
    /// # Errors
    ///
    /// Returns [`PendingNotificationError`] when the store read fails or the
    /// record is corrupt.
    pub async fn peek_pending(&self) -> Result<Option<PendingNotification>, PendingNotificationError> {
        let Some(raw) = self.store.get(PENDING_NOTIFICATION_KEY).await? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(PendingNotificationError::Corrupt)
    }

    /// Read and clear the pending record.
    ///
    /// A corrupt record is cleared as well so it cannot block later launches.
    ///
    /// # Errors
    ///
    /// Returns [`PendingNotificationError`] when the store fails or the
    /// record is corrupt.
    pub async fn take_pending(&self) -> Result<Option<PendingNotification>, PendingNotificationError> {
        let Some(raw) = self.store.get(PENDING_NOTIFICATION_KEY).await? else {
            debug!("no pending notification to consume");
            return Ok(None);
        };
        self.store.remove(PENDING_NOTIFICATION_KEY).await?;

        match serde_json::from_str::<PendingNotification>(&raw) {
            Ok(record) => {
                info!(timestamp = record.timestamp, "pending notification consumed");
                Ok(Some(record))
            }
            Err(error) => {
                warn!(error = %error, "discarded corrupt pending notification");
                Err(PendingNotificationError::Corrupt(error))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::{TimeZone, Utc};
    use rstest::{fixture, rstest};
    use serde_json::json;

    use super::*;
    use crate::domain::ports::MockKeyValueStore;
    use crate::outbound::kv::InMemoryKeyValueStore;
    use crate::test_support::MutableClock;

    const T0: i64 = 1_700_000_000_000;

    fn data(pairs: &[(&str, &str)]) -> NotificationData {
        let raw: BTreeMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        NotificationData::from_map(&raw)
    }

    fn stored_json(store: &InMemoryKeyValueStore) -> serde_json::Value {
        let raw = store
            .snapshot()
            .get(PENDING_NOTIFICATION_KEY)
            .cloned()
            .expect("pending slot should be written");
        serde_json::from_str(&raw).expect("pending slot should hold JSON")
    }

    struct Harness {
        store: Arc<InMemoryKeyValueStore>,
        clock: Arc<MutableClock>,
        recorder: PendingNavigationRecorder,
    }

    #[fixture]
    fn harness() -> Harness {
        let store = Arc::new(InMemoryKeyValueStore::new());
        let clock = Arc::new(MutableClock::new(
            Utc.timestamp_millis_opt(T0).single().expect("valid timestamp"),
        ));
        let recorder = PendingNavigationRecorder::new(store.clone(), clock.clone());
        Harness {
            store,
            clock,
            recorder,
        }
    }

    #[rstest]
    #[tokio::test]
    async fn record_omits_absent_fields_and_stamps_time(harness: Harness) {
        harness
            .recorder
            .record_pending(&data(&[
                ("group_id", "g1"),
                ("photo_id", "p7"),
                ("type", "comment"),
                ("comment_id", "c3"),
            ]))
            .await
            .expect("record should succeed");

        assert_eq!(
            stored_json(&harness.store),
            json!({
                "group_id": "g1",
                "type": "comment",
                "photo_id": "p7",
                "comment_id": "c3",
                "timestamp": T0,
            })
        );
    }

    #[rstest]
    #[tokio::test]
    async fn message_id_is_stored_in_camel_case(harness: Harness) {
        harness
            .recorder
            .record_pending(&data(&[("groupId", "g1"), ("message_id", "m1")]))
            .await
            .expect("record should succeed");

        assert_eq!(
            stored_json(&harness.store),
            json!({ "group_id": "g1", "messageId": "m1", "timestamp": T0 })
        );
    }

    #[rstest]
    #[tokio::test]
    async fn last_write_wins(harness: Harness) {
        harness
            .recorder
            .record_pending(&data(&[("group_id", "a")]))
            .await
            .expect("first record should succeed");
        harness.clock.advance_millis(5);
        harness
            .recorder
            .record_pending(&data(&[("photo_id", "b")]))
            .await
            .expect("second record should succeed");

        assert_eq!(
            stored_json(&harness.store),
            json!({ "photo_id": "b", "timestamp": T0 + 5 })
        );
    }

    #[rstest]
    #[tokio::test]
    async fn take_pending_clears_the_slot(harness: Harness) {
        harness
            .recorder
            .record_pending(&data(&[("group_id", "g1")]))
            .await
            .expect("record should succeed");

        let peeked = harness.recorder.peek_pending().await.expect("peek should succeed");
        let taken = harness.recorder.take_pending().await.expect("take should succeed");
        assert_eq!(peeked, taken);
        assert!(harness.store.snapshot().is_empty());
        assert!(
            harness
                .recorder
                .take_pending()
                .await
                .expect("second take should succeed")
                .is_none()
        );
    }

    #[rstest]
    #[tokio::test]
    async fn corrupt_record_is_cleared_and_reported(harness: Harness) {
        harness
            .store
            .set(PENDING_NOTIFICATION_KEY, "{not json")
            .await
            .expect("seed should succeed");

        let err = harness
            .recorder
            .take_pending()
            .await
            .expect_err("corrupt record should be reported");
        assert!(matches!(err, PendingNotificationError::Corrupt(_)));
        assert!(harness.store.snapshot().is_empty());
    }

    #[tokio::test]
    async fn failed_write_reports_store_error() {
        let mut store = MockKeyValueStore::new();
        store
            .expect_set()
            .times(1)
            .returning(|key, _| Err(KeyValueStoreError::write(key, "quota exceeded")));
        let clock = Arc::new(MutableClock::new(Utc::now()));
        let recorder = PendingNavigationRecorder::new(Arc::new(store), clock);

        let err = recorder
            .record_pending(&data(&[("group_id", "g1")]))
            .await
            .expect_err("write failure should surface");
        assert!(matches!(err, PendingNotificationError::Store(_)));
    }

    #[rstest]
    #[case(&[("group_id", "g1"), ("photo_id", "p7"), ("comment_id", "c3")], Some(NavigationTarget::Photo {
        group_id: Some("g1".to_owned()),
        photo_id: "p7".to_owned(),
        comment_id: Some("c3".to_owned()),
    }))]
    #[case(&[("group_id", "g1")], Some(NavigationTarget::Group { group_id: "g1".to_owned() }))]
    #[case(&[("type", "comment")], None)]
    fn navigation_target_prefers_photo(
        #[case] pairs: &[(&str, &str)],
        #[case] expected: Option<NavigationTarget>,
    ) {
        let record = PendingNotification::from_data(&data(pairs), T0);
        assert_eq!(record.navigation_target(), expected);
    }
}
