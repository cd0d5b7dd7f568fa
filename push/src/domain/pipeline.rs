//! Wiring of the pipeline services over one set of ports.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::ports::{KeyValueStore, NotificationPresenter};
use crate::domain::{
    BackgroundDeliveryService, DedupeGate, NotificationInteractionService,
    PendingNavigationRecorder, PresentationSettings,
};

/// Ports shared by every pipeline entry point.
#[derive(Clone)]
pub struct PushPipelinePorts {
    /// Durable store holding dedupe markers and the pending slot.
    pub store: Arc<dyn KeyValueStore>,
    /// OS local-notification API.
    pub presenter: Arc<dyn NotificationPresenter>,
    /// Wall clock for pending timestamps.
    pub clock: Arc<dyn Clock>,
}

impl PushPipelinePorts {
    /// Bundle the ports.
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        presenter: Arc<dyn NotificationPresenter>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            presenter,
            clock,
        }
    }
}

/// Both pipeline entry points plus the cold-start recorder.
///
/// Built once at process start and handed to
/// [`crate::inbound::host::register_push_handlers`].
#[derive(Clone)]
pub struct PushPipeline {
    /// Background message entry point.
    pub delivery: Arc<BackgroundDeliveryService>,
    /// Notification interaction entry point.
    pub interaction: Arc<NotificationInteractionService>,
    /// Pending slot access for the cold-start consumer.
    pub recorder: PendingNavigationRecorder,
}

impl PushPipeline {
    /// Construct every service over `ports`.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::Arc;
    /// use mockable::DefaultClock;
    /// use momtn_push::domain::PresentationSettings;
    /// use momtn_push::domain::ports::{FixtureKeyValueStore, FixtureNotificationPresenter};
    /// use momtn_push::{PushPipeline, PushPipelinePorts};
    ///
    /// let ports = PushPipelinePorts::new(
    ///     Arc::new(FixtureKeyValueStore),
    ///     Arc::new(FixtureNotificationPresenter),
    ///     Arc::new(DefaultClock),
    /// );
    /// let _pipeline = PushPipeline::new(ports, PresentationSettings::default());
    /// ```
    #[must_use]
    pub fn new(ports: PushPipelinePorts, settings: PresentationSettings) -> Self {
        let PushPipelinePorts {
            store,
            presenter,
            clock,
        } = ports;
        let recorder = PendingNavigationRecorder::new(store.clone(), clock);
        let delivery = BackgroundDeliveryService::new(
            DedupeGate::new(store),
            recorder.clone(),
            presenter,
            settings,
        );
        Self {
            delivery: Arc::new(delivery),
            interaction: Arc::new(NotificationInteractionService::new(recorder.clone())),
            recorder,
        }
    }
}
