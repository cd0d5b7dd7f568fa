//! Push envelope and its canonical data record.
//!
//! Push senders spell data keys in snake_case or camelCase, sometimes both.
//! [`NotificationData::from_map`] folds every alias into one canonical record
//! before any business logic runs, so dedupe, pending-navigation and display
//! code never repeat fallback chains.

use std::collections::BTreeMap;

const NOTIFICATION_ID: &[&str] = &["notification_id", "notificationId"];
const MESSAGE_ID: &[&str] = &["messageId", "message_id"];
const PHOTO_ID: &[&str] = &["photo_id", "photoId"];
const TYPE: &[&str] = &["type"];
const GROUP_ID: &[&str] = &["group_id", "groupId"];
const COMMENT_ID: &[&str] = &["comment_id", "commentId"];
const PARENT_COMMENT_ID: &[&str] = &["parent_comment_id", "parentCommentId"];
const DEDUPE_KEY: &[&str] = &["dedupe_key", "dedupeKey"];
const TITLE: &[&str] = &["title"];
const BODY: &[&str] = &["body"];

/// OS-rendered notification block of a push.
///
/// When present and the app is not in the foreground the platform draws the
/// banner itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationBlock {
    /// Banner title.
    pub title: Option<String>,
    /// Banner body.
    pub body: Option<String>,
}

/// Remote push payload as delivered to the process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PushEnvelope {
    /// Optional OS-rendered notification block.
    pub notification: Option<NotificationBlock>,
    /// String data payload.
    pub data: BTreeMap<String, String>,
}

impl PushEnvelope {
    /// Build a data-only envelope.
    ///
    /// # Examples
    ///
    /// ```
    /// use momtn_push::domain::PushEnvelope;
    ///
    /// let envelope = PushEnvelope::data_only([("groupId", "g1")]);
    /// assert!(!envelope.has_native_notification());
    /// assert_eq!(envelope.fields().group_id.as_deref(), Some("g1"));
    /// ```
    pub fn data_only<K, V>(data: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            notification: None,
            data: data
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }

    /// Attach an OS-rendered notification block.
    #[must_use]
    pub fn with_notification(mut self, block: NotificationBlock) -> Self {
        self.notification = Some(block);
        self
    }

    /// Whether the platform renders this push itself.
    #[must_use]
    pub fn has_native_notification(&self) -> bool {
        self.notification.is_some()
    }

    /// Canonical view of the data payload.
    #[must_use]
    pub fn fields(&self) -> NotificationData {
        NotificationData::from_map(&self.data)
    }
}

/// Canonical notification data with aliases resolved.
///
/// Absent, empty and whitespace-only values are all `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationData {
    /// Server-side notification identifier.
    pub notification_id: Option<String>,
    /// Chat or comment message identifier.
    pub message_id: Option<String>,
    /// Photo (gratitude moment) identifier.
    pub photo_id: Option<String>,
    /// Notification type, e.g. `comment` or `new_photo`.
    pub kind: Option<String>,
    /// Group identifier.
    pub group_id: Option<String>,
    /// Comment identifier.
    pub comment_id: Option<String>,
    /// Parent comment identifier for replies.
    pub parent_comment_id: Option<String>,
    /// Explicit sender-supplied dedupe key.
    pub dedupe_key: Option<String>,
    /// Data-supplied banner title.
    pub title: Option<String>,
    /// Data-supplied banner body.
    pub body: Option<String>,
}

impl NotificationData {
    /// Normalize a raw data map.
    ///
    /// Each field is looked up through its alias list in order: snake_case
    /// first, except `messageId` which prefers camelCase.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::collections::BTreeMap;
    /// use momtn_push::domain::NotificationData;
    ///
    /// let mut raw = BTreeMap::new();
    /// raw.insert("photoId".to_owned(), "p7".to_owned());
    /// raw.insert("message_id".to_owned(), "m1".to_owned());
    /// let data = NotificationData::from_map(&raw);
    /// assert_eq!(data.photo_id.as_deref(), Some("p7"));
    /// assert_eq!(data.message_id.as_deref(), Some("m1"));
    /// ```
    #[must_use]
    pub fn from_map(raw: &BTreeMap<String, String>) -> Self {
        Self {
            notification_id: first_present(raw, NOTIFICATION_ID),
            message_id: first_present(raw, MESSAGE_ID),
            photo_id: first_present(raw, PHOTO_ID),
            kind: first_present(raw, TYPE),
            group_id: first_present(raw, GROUP_ID),
            comment_id: first_present(raw, COMMENT_ID),
            parent_comment_id: first_present(raw, PARENT_COMMENT_ID),
            dedupe_key: first_present(raw, DEDUPE_KEY),
            title: first_present(raw, TITLE),
            body: first_present(raw, BODY),
        }
    }

    /// Whether the data points at a group or photo screen.
    #[must_use]
    pub fn has_navigation_target(&self) -> bool {
        self.group_id.is_some() || self.photo_id.is_some()
    }

    /// Value identifying the logical event for de-duplication.
    ///
    /// First present of: dedupe key, message id, photo id, notification id.
    #[must_use]
    pub fn dedupe_value(&self) -> Option<&str> {
        self.dedupe_key
            .as_deref()
            .or(self.message_id.as_deref())
            .or(self.photo_id.as_deref())
            .or(self.notification_id.as_deref())
    }
}

fn first_present(raw: &BTreeMap<String, String>, aliases: &[&str]) -> Option<String> {
    aliases
        .iter()
        .filter_map(|alias| raw.get(*alias))
        .find(|value| !value.trim().is_empty())
        .cloned()
}
