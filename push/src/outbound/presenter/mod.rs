//! Headless notification presenter.

use async_trait::async_trait;
use tracing::info;

use crate::domain::ports::{NotificationPresenter, NotificationPresenterError};
use crate::domain::{LocalNotificationRequest, NotificationChannel};

/// Presenter that writes notifications to the `tracing` output instead of
/// the OS.
///
/// Used by the operator CLI and on hosts without a notification surface.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotificationPresenter;

#[async_trait]
impl NotificationPresenter for TracingNotificationPresenter {
    async fn create_channel(
        &self,
        channel: &NotificationChannel,
    ) -> Result<String, NotificationPresenterError> {
        info!(
            channel_id = %channel.id,
            channel_name = %channel.name,
            importance = ?channel.importance,
            "notification channel ensured"
        );
        Ok(channel.id.clone())
    }

    async fn display(
        &self,
        request: &LocalNotificationRequest,
    ) -> Result<String, NotificationPresenterError> {
        let data = serde_json::to_string(&request.data)
            .map_err(|err| NotificationPresenterError::display(err.to_string()))?;
        info!(
            notification_id = %request.id,
            channel_id = %request.channel_id,
            title = %request.title,
            body = %request.body,
            data = %data,
            "local notification"
        );
        Ok(request.id.clone())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::domain::PresentationSettings;

    #[tokio::test]
    async fn returns_request_identifiers() {
        let settings = PresentationSettings::default();
        let presenter = TracingNotificationPresenter;

        let channel_id = presenter
            .create_channel(&settings.channel())
            .await
            .expect("channel succeeds");
        let request = settings.local_notification("t", "b", BTreeMap::new(), &channel_id);
        let id = presenter.display(&request).await.expect("display succeeds");

        assert_eq!(channel_id, settings.channel_id);
        assert_eq!(id, request.id);
    }
}
