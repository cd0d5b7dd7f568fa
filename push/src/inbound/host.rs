//! Registration of pipeline entry points with the host platform.
//!
//! The host (mobile runtime, test harness, CLI) owns the event sources. At
//! process start it receives both handlers through
//! [`register_push_handlers`]; nothing in the crate is a global.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{
    BackgroundDeliveryService, DeliveryOutcome, InteractionOutcome, NotificationEvent,
    NotificationInteractionService, PushEnvelope, PushPipeline,
};

/// Receives remote pushes delivered outside the foreground UI.
#[async_trait]
pub trait BackgroundMessageHandler: Send + Sync {
    /// Handle one remote push. Must not fail.
    async fn on_background_message(&self, envelope: PushEnvelope) -> DeliveryOutcome;
}

/// Receives interaction events for displayed local notifications.
#[async_trait]
pub trait NotificationEventHandler: Send + Sync {
    /// Handle one interaction event. Must not fail.
    async fn on_notification_event(&self, event: NotificationEvent) -> InteractionOutcome;
}

#[async_trait]
impl BackgroundMessageHandler for BackgroundDeliveryService {
    async fn on_background_message(&self, envelope: PushEnvelope) -> DeliveryOutcome {
        self.handle_background_message(&envelope).await
    }
}

#[async_trait]
impl NotificationEventHandler for NotificationInteractionService {
    async fn on_notification_event(&self, event: NotificationEvent) -> InteractionOutcome {
        self.handle_event(&event).await
    }
}

/// Host-platform registration surface.
pub trait PushHost {
    /// Install the background push handler, replacing any previous one.
    fn set_background_message_handler(&mut self, handler: Arc<dyn BackgroundMessageHandler>);

    /// Install the notification event handler, replacing any previous one.
    fn set_notification_event_handler(&mut self, handler: Arc<dyn NotificationEventHandler>);
}

/// Register both pipeline entry points with `host`.
pub fn register_push_handlers(host: &mut impl PushHost, pipeline: &PushPipeline) {
    host.set_background_message_handler(pipeline.delivery.clone());
    host.set_notification_event_handler(pipeline.interaction.clone());
    tracing::debug!("push handlers registered");
}

/// Raised when an event arrives before its handler is registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HostError {
    /// No background handler installed.
    #[error("no background message handler registered")]
    NoBackgroundHandler,
    /// No notification event handler installed.
    #[error("no notification event handler registered")]
    NoEventHandler,
}

/// Host that dispatches events in the current process.
#[derive(Default, Clone)]
pub struct InProcessHost {
    background: Option<Arc<dyn BackgroundMessageHandler>>,
    events: Option<Arc<dyn NotificationEventHandler>>,
}

impl InProcessHost {
    /// Host with no handlers installed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver a remote push to the registered handler.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::NoBackgroundHandler`] before registration.
    pub async fn deliver(&self, envelope: PushEnvelope) -> Result<DeliveryOutcome, HostError> {
        let handler = self
            .background
            .as_ref()
            .ok_or(HostError::NoBackgroundHandler)?;
        Ok(handler.on_background_message(envelope).await)
    }

    /// Forward an interaction event to the registered handler.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::NoEventHandler`] before registration.
    pub async fn dispatch(&self, event: NotificationEvent) -> Result<InteractionOutcome, HostError> {
        let handler = self.events.as_ref().ok_or(HostError::NoEventHandler)?;
        Ok(handler.on_notification_event(event).await)
    }
}

impl PushHost for InProcessHost {
    fn set_background_message_handler(&mut self, handler: Arc<dyn BackgroundMessageHandler>) {
        self.background = Some(handler);
    }

    fn set_notification_event_handler(&mut self, handler: Arc<dyn NotificationEventHandler>) {
        self.events = Some(handler);
    }
}
