//! Domain types and services of the push pipeline.
//!
//! Nothing here talks to the OS or the disk directly; every side effect goes
//! through [`ports`].

pub mod ports;

mod dedupe;
mod delivery;
mod envelope;
mod interaction;
mod pending;
mod pipeline;
mod presentation;

pub use dedupe::{DEDUPE_KEY_PREFIX, DedupeDecision, DedupeGate, DedupeStorageKey};
pub use delivery::{BackgroundDeliveryService, DeliveryOutcome};
pub use envelope::{NotificationBlock, NotificationData, PushEnvelope};
pub use interaction::{
    DisplayedNotification, InteractionOutcome, NotificationEvent, NotificationEventKind,
    NotificationInteractionService,
};
pub use pending::{
    NavigationTarget, PENDING_NOTIFICATION_KEY, PendingNavigationRecorder, PendingNotification,
    PendingNotificationError,
};
pub use pipeline::{PushPipeline, PushPipelinePorts};
pub use presentation::{
    DEFAULT_BODY, DEFAULT_CHANNEL_ID, DEFAULT_CHANNEL_NAME, DEFAULT_OPEN_ACTION_TITLE,
    DEFAULT_PRESS_ACTION_ID, DEFAULT_TITLE, Importance, LocalNotificationRequest,
    NotificationAction, NotificationChannel, OPEN_ACTION_ID, PresentationSettings,
};
