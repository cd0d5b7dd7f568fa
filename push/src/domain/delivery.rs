//! Background delivery orchestration.
//!
//! Runs for every remote push, whether the app is foreground, backgrounded or
//! killed. The phases run in a fixed order: dedupe gate, pending-navigation
//! recording, native-banner check, then local presentation. Each phase
//! contains its own failures so the entry point always completes with a
//! [`DeliveryOutcome`].

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::domain::ports::{NotificationPresenter, NotificationPresenterError};
use crate::domain::{
    DedupeDecision, DedupeGate, DedupeStorageKey, NotificationData, PendingNavigationRecorder,
    PresentationSettings, PushEnvelope,
};

/// Terminal state of one background delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DeliveryOutcome {
    /// The event was already shown; nothing else happened.
    Suppressed {
        /// Marker that matched.
        dedupe_key: DedupeStorageKey,
    },
    /// The platform renders the banner itself.
    SkippedNative {
        /// Whether the pending slot was written.
        pending_recorded: bool,
    },
    /// A local notification was displayed.
    Presented {
        /// Platform notification identifier.
        notification_id: String,
        /// Whether the pending slot was written.
        pending_recorded: bool,
    },
    /// Displaying the local notification failed.
    PresentationFailed {
        /// Whether the pending slot was written.
        pending_recorded: bool,
    },
}

impl DeliveryOutcome {
    /// Whether the delivery wrote the pending-navigation slot.
    #[must_use]
    pub const fn pending_recorded(&self) -> bool {
        match self {
            Self::Suppressed { .. } => false,
            Self::SkippedNative { pending_recorded }
            | Self::Presented {
                pending_recorded, ..
            }
            | Self::PresentationFailed { pending_recorded } => *pending_recorded,
        }
    }
}

/// Handles remote pushes delivered while the app is not in control.
#[derive(Clone)]
pub struct BackgroundDeliveryService {
    dedupe: DedupeGate,
    recorder: PendingNavigationRecorder,
    presenter: Arc<dyn NotificationPresenter>,
    settings: PresentationSettings,
}

impl BackgroundDeliveryService {
    /// Assemble the service from its collaborators.
    pub fn new(
        dedupe: DedupeGate,
        recorder: PendingNavigationRecorder,
        presenter: Arc<dyn NotificationPresenter>,
        settings: PresentationSettings,
    ) -> Self {
        Self {
            dedupe,
            recorder,
            presenter,
            settings,
        }
    }

    /// Process one remote push.
    ///
    /// Never fails: storage and display errors are logged and reflected in
    /// the returned outcome.
    pub async fn handle_background_message(&self, envelope: &PushEnvelope) -> DeliveryOutcome {
        let data = envelope.fields();
        info!(
            kind = data.kind.as_deref().unwrap_or_default(),
            native = envelope.has_native_notification(),
            "background push received"
        );

        if let DedupeDecision::Duplicate(dedupe_key) = self.dedupe.check(&data).await {
            return DeliveryOutcome::Suppressed { dedupe_key };
        }

        let pending_recorded = self.record_navigation_target(&data).await;

        if envelope.has_native_notification() {
            debug!("platform renders this push; skipping local notification");
            return DeliveryOutcome::SkippedNative { pending_recorded };
        }

        let (title, body) = self.resolve_text(envelope, &data);
        match self.present(title, body, envelope.data.clone()).await {
            Ok(notification_id) => {
                info!(notification_id = %notification_id, "local notification displayed");
                DeliveryOutcome::Presented {
                    notification_id,
                    pending_recorded,
                }
            }
            Err(error) => {
                warn!(error = %error, "failed to display local notification");
                DeliveryOutcome::PresentationFailed { pending_recorded }
            }
        }
    }

    async fn record_navigation_target(&self, data: &NotificationData) -> bool {
        if !data.has_navigation_target() {
            return false;
        }
        match self.recorder.record_pending(data).await {
            Ok(_) => true,
            Err(error) => {
                warn!(error = %error, "failed to record pending notification");
                false
            }
        }
    }

    /// Title and body: data payload, then notification block, then defaults.
    fn resolve_text(&self, envelope: &PushEnvelope, data: &NotificationData) -> (String, String) {
        let block = envelope.notification.as_ref();
        let pick = |from_data: Option<&String>, from_block: Option<&String>, fallback: &String| {
            from_data
                .or_else(|| from_block.filter(|value| !value.trim().is_empty()))
                .unwrap_or(fallback)
                .clone()
        };
        let title = pick(
            data.title.as_ref(),
            block.and_then(|b| b.title.as_ref()),
            &self.settings.default_title,
        );
        let body = pick(
            data.body.as_ref(),
            block.and_then(|b| b.body.as_ref()),
            &self.settings.default_body,
        );
        (title, body)
    }

    async fn present(
        &self,
        title: String,
        body: String,
        payload: BTreeMap<String, String>,
    ) -> Result<String, NotificationPresenterError> {
        let channel_id = match self.presenter.create_channel(&self.settings.channel()).await {
            Ok(channel_id) => channel_id,
            Err(error) => {
                warn!(
                    channel_id = %self.settings.channel_id,
                    error = %error,
                    "failed to ensure notification channel; displaying on configured id"
                );
                self.settings.channel_id.clone()
            }
        };
        let request = self
            .settings
            .local_notification(title, body, payload, &channel_id);
        self.presenter.display(&request).await
    }
}

#[cfg(test)]
#[path = "delivery_tests.rs"]
mod tests;
