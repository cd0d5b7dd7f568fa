//! Handling of user interactions with displayed local notifications.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::domain::{NotificationData, OPEN_ACTION_ID, PendingNavigationRecorder};

/// Kind of interaction reported by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationEventKind {
    /// The notification body was tapped.
    Press,
    /// A labelled action button was tapped.
    ActionPress {
        /// Press action identifier of the button.
        action_id: String,
    },
    /// The notification was swiped away.
    Dismissed,
    /// The notification was posted by the OS.
    Delivered,
    /// Any other lifecycle event the host forwards.
    Other,
}

/// Notification the event refers to, with its attached data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayedNotification {
    /// Platform notification identifier, when reported.
    pub id: Option<String>,
    /// Data payload attached at display time.
    pub data: BTreeMap<String, String>,
}

/// One interaction event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationEvent {
    /// What happened.
    pub kind: NotificationEventKind,
    /// Notification involved, if the host reported one.
    pub notification: Option<DisplayedNotification>,
}

impl NotificationEvent {
    /// Press on the body of a notification carrying `data`.
    pub fn press<K, V>(data: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            kind: NotificationEventKind::Press,
            notification: Some(DisplayedNotification {
                id: None,
                data: data
                    .into_iter()
                    .map(|(key, value)| (key.into(), value.into()))
                    .collect(),
            }),
        }
    }

    /// Dismissal of an unidentified notification.
    #[must_use]
    pub const fn dismissed() -> Self {
        Self {
            kind: NotificationEventKind::Dismissed,
            notification: None,
        }
    }

    fn opens_app(&self) -> bool {
        match &self.kind {
            NotificationEventKind::Press => true,
            NotificationEventKind::ActionPress { action_id } => action_id == OPEN_ACTION_ID,
            NotificationEventKind::Dismissed
            | NotificationEventKind::Delivered
            | NotificationEventKind::Other => false,
        }
    }
}

/// Result of handling one interaction event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionOutcome {
    /// The pending slot now points at the pressed notification.
    PendingRecorded,
    /// Press carried no group or photo id.
    NoNavigationTarget,
    /// Writing the pending slot failed.
    PendingFailed,
    /// Event did not open the app; logged only.
    Ignored,
}

/// Handles press and dismiss events for local notifications.
#[derive(Clone)]
pub struct NotificationInteractionService {
    recorder: PendingNavigationRecorder,
}

impl NotificationInteractionService {
    /// Create the service over the shared pending recorder.
    pub const fn new(recorder: PendingNavigationRecorder) -> Self {
        Self { recorder }
    }

    /// Process one interaction event. Never fails.
    pub async fn handle_event(&self, event: &NotificationEvent) -> InteractionOutcome {
        let notification_id = event
            .notification
            .as_ref()
            .and_then(|n| n.id.as_deref())
            .unwrap_or_default();

        if !event.opens_app() {
            info!(kind = ?event.kind, notification_id, "notification event ignored");
            return InteractionOutcome::Ignored;
        }

        let data = event
            .notification
            .as_ref()
            .map(|n| NotificationData::from_map(&n.data))
            .unwrap_or_default();
        if !data.has_navigation_target() {
            debug!(notification_id, "pressed notification has no navigation target");
            return InteractionOutcome::NoNavigationTarget;
        }

        match self.recorder.record_pending(&data).await {
            Ok(_) => InteractionOutcome::PendingRecorded,
            Err(error) => {
                warn!(notification_id, error = %error, "failed to record pending notification on press");
                InteractionOutcome::PendingFailed
            }
        }
    }
}
