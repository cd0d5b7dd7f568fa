//! Port abstraction for the OS local-notification API.

use async_trait::async_trait;

use crate::domain::{LocalNotificationRequest, NotificationChannel};

use super::define_port_error;

define_port_error! {
    /// Errors surfaced by notification presenter adapters.
    pub enum NotificationPresenterError {
        /// The notification channel could not be created.
        Channel { channel_id: String, message: String } => "failed to create notification channel '{channel_id}': {message}",
        /// The OS rejected the display request.
        Display { message: String } => "failed to display local notification: {message}",
    }
}

/// Port for displaying local notifications.
///
/// Interaction events (press, dismiss) flow the other way and arrive through
/// [`crate::inbound::host::NotificationEventHandler`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationPresenter: Send + Sync {
    /// Create or update a notification channel and return its identifier.
    ///
    /// Re-creating a channel with an existing identifier must be a no-op for
    /// the OS, so callers invoke this before every display.
    async fn create_channel(
        &self,
        channel: &NotificationChannel,
    ) -> Result<String, NotificationPresenterError>;

    /// Display a local notification and return the platform notification id.
    async fn display(
        &self,
        request: &LocalNotificationRequest,
    ) -> Result<String, NotificationPresenterError>;
}

/// Fixture presenter that accepts everything and shows nothing.
#[derive(Debug, Default)]
pub struct FixtureNotificationPresenter;

#[async_trait]
impl NotificationPresenter for FixtureNotificationPresenter {
    async fn create_channel(
        &self,
        channel: &NotificationChannel,
    ) -> Result<String, NotificationPresenterError> {
        Ok(channel.id.clone())
    }

    async fn display(
        &self,
        request: &LocalNotificationRequest,
    ) -> Result<String, NotificationPresenterError> {
        Ok(request.id.clone())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::domain::PresentationSettings;

    #[tokio::test]
    async fn fixture_presenter_echoes_identifiers() {
        let settings = PresentationSettings::default();
        let presenter = FixtureNotificationPresenter;

        let channel_id = presenter
            .create_channel(&settings.channel())
            .await
            .expect("fixture channel creation should succeed");
        assert_eq!(channel_id, settings.channel_id);

        let request = settings.local_notification("title", "body", BTreeMap::new(), &channel_id);
        let shown = presenter
            .display(&request)
            .await
            .expect("fixture display should succeed");
        assert_eq!(shown, request.id);
    }

    #[test]
    fn channel_error_names_the_channel() {
        let err = NotificationPresenterError::channel("default", "no permission");
        assert_eq!(
            err.to_string(),
            "failed to create notification channel 'default': no permission"
        );
    }
}
