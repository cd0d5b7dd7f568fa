//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod key_value_store;
mod notification_presenter;

#[cfg(test)]
pub use key_value_store::MockKeyValueStore;
pub use key_value_store::{FixtureKeyValueStore, KeyValueStore, KeyValueStoreError};
#[cfg(test)]
pub use notification_presenter::MockNotificationPresenter;
pub use notification_presenter::{
    FixtureNotificationPresenter, NotificationPresenter, NotificationPresenterError,
};
