//! Inbound adapters: push transport decoding and host registration.

pub mod fcm;
pub mod host;
