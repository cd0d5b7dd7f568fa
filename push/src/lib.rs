//! Push notification pipeline for the Momtn client.
//!
//! The crate owns three concerns that must survive the host process being
//! killed between a push arriving and the user opening the app:
//!
//! - de-duplicating deliveries so one logical event shows one banner;
//! - recording a single pending navigation target for the next cold start;
//! - presenting local notifications for data-only pushes.
//!
//! Everything stateful goes through the [`domain::ports::KeyValueStore`]
//! port; the host platform supplies the store, the notification presenter,
//! and the registration hooks in [`inbound::host`].

pub mod config;
pub mod domain;
pub mod inbound;
pub mod logging;
pub mod outbound;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use domain::{
    BackgroundDeliveryService, DeliveryOutcome, NotificationInteractionService, PushPipeline,
    PushPipelinePorts,
};
