//! Local notification channel and display request types.

use std::collections::BTreeMap;

use serde::Serialize;
use uuid::Uuid;

/// Press action identifier launched when the notification body is tapped.
pub const DEFAULT_PRESS_ACTION_ID: &str = "default";

/// Press action identifier of the labelled "open" action button.
pub const OPEN_ACTION_ID: &str = "open";

/// Default channel identifier.
pub const DEFAULT_CHANNEL_ID: &str = "default";

/// Default channel display name.
pub const DEFAULT_CHANNEL_NAME: &str = "Default Channel";

/// Title used when neither the data payload nor the notification block has one.
pub const DEFAULT_TITLE: &str = "إشعار جديد";

/// Body used when neither the data payload nor the notification block has one.
pub const DEFAULT_BODY: &str = "لديك إشعار جديد";

/// Label of the "open" action button.
pub const DEFAULT_OPEN_ACTION_TITLE: &str = "فتح";

/// Notification importance as understood by the host platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Importance {
    /// Platform default importance; no heads-up banner.
    Default,
    /// Heads-up banner with sound.
    High,
}

/// Channel descriptor the OS requires before any local notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationChannel {
    /// Stable channel identifier.
    pub id: String,
    /// User-visible channel name.
    pub name: String,
    /// Importance applied to every notification on the channel.
    pub importance: Importance,
    /// Sound resource name; `default` selects the system sound.
    pub sound: String,
    /// Whether notifications vibrate.
    pub vibration: bool,
}

/// Additional labelled action button on a notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationAction {
    /// Button label.
    pub title: String,
    /// Press action identifier reported back on interaction.
    pub press_action_id: String,
}

/// Request to display one local notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocalNotificationRequest {
    /// Client-generated notification identifier.
    pub id: String,
    /// Banner title.
    pub title: String,
    /// Banner body.
    pub body: String,
    /// Raw data payload, attached so it survives until the user interacts.
    pub data: BTreeMap<String, String>,
    /// Channel the notification is posted on.
    pub channel_id: String,
    /// Importance of this notification.
    pub importance: Importance,
    /// Press action launched by tapping the body.
    pub press_action_id: String,
    /// Extra labelled actions.
    pub actions: Vec<NotificationAction>,
}

/// Presentation settings for locally displayed notifications.
///
/// # Examples
///
/// ```
/// use momtn_push::domain::{PresentationSettings, DEFAULT_TITLE};
///
/// let settings = PresentationSettings::default();
/// assert_eq!(settings.default_title, DEFAULT_TITLE);
/// assert!(settings.channel().vibration);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresentationSettings {
    /// Channel identifier.
    pub channel_id: String,
    /// Channel display name.
    pub channel_name: String,
    /// Fallback banner title.
    pub default_title: String,
    /// Fallback banner body.
    pub default_body: String,
    /// Label of the "open" action button.
    pub open_action_title: String,
}

impl Default for PresentationSettings {
    fn default() -> Self {
        Self {
            channel_id: DEFAULT_CHANNEL_ID.to_owned(),
            channel_name: DEFAULT_CHANNEL_NAME.to_owned(),
            default_title: DEFAULT_TITLE.to_owned(),
            default_body: DEFAULT_BODY.to_owned(),
            open_action_title: DEFAULT_OPEN_ACTION_TITLE.to_owned(),
        }
    }
}

impl PresentationSettings {
    /// Channel descriptor: high importance, default sound, vibration on.
    #[must_use]
    pub fn channel(&self) -> NotificationChannel {
        NotificationChannel {
            id: self.channel_id.clone(),
            name: self.channel_name.clone(),
            importance: Importance::High,
            sound: "default".to_owned(),
            vibration: true,
        }
    }

    /// Build a display request on `channel_id` with a fresh identifier.
    #[must_use]
    pub fn local_notification(
        &self,
        title: impl Into<String>,
        body: impl Into<String>,
        data: BTreeMap<String, String>,
        channel_id: &str,
    ) -> LocalNotificationRequest {
        LocalNotificationRequest {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            body: body.into(),
            data,
            channel_id: channel_id.to_owned(),
            importance: Importance::High,
            press_action_id: DEFAULT_PRESS_ACTION_ID.to_owned(),
            actions: vec![NotificationAction {
                title: self.open_action_title.clone(),
                press_action_id: OPEN_ACTION_ID.to_owned(),
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_notification_carries_open_action_and_default_press() {
        let settings = PresentationSettings::default();
        let mut data = BTreeMap::new();
        data.insert("group_id".to_owned(), "g1".to_owned());

        let request = settings.local_notification("t", "b", data.clone(), "default");

        assert_eq!(request.press_action_id, DEFAULT_PRESS_ACTION_ID);
        assert_eq!(request.actions.len(), 1);
        assert_eq!(
            request.actions.first().map(|a| a.press_action_id.as_str()),
            Some(OPEN_ACTION_ID)
        );
        assert_eq!(request.data, data);
        assert_eq!(request.importance, Importance::High);
    }

    #[test]
    fn each_request_gets_a_distinct_identifier() {
        let settings = PresentationSettings::default();
        let a = settings.local_notification("t", "b", BTreeMap::new(), "default");
        let b = settings.local_notification("t", "b", BTreeMap::new(), "default");
        assert_ne!(a.id, b.id);
    }
}
