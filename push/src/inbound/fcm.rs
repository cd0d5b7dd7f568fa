//! Firebase-style remote message decoding.
//!
//! The transport hands over JSON shaped like
//! `{"messageId": "...", "notification": {"title", "body"}, "data": {...}}`.
//! Data values are meant to be strings, but senders occasionally emit numbers
//! or booleans; those are stringified. Nulls and nested values have no string
//! form and are dropped.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::domain::{NotificationBlock, PushEnvelope};

/// Errors raised while decoding a transport payload.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    /// The payload is not JSON of the expected shape.
    #[error("malformed push payload: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemoteMessageDto {
    #[serde(default)]
    message_id: Option<String>,
    #[serde(default)]
    notification: Option<NotificationDto>,
    #[serde(default)]
    data: BTreeMap<String, Value>,
}

#[derive(Debug, Deserialize)]
struct NotificationDto {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    body: Option<String>,
}

impl From<NotificationDto> for NotificationBlock {
    fn from(value: NotificationDto) -> Self {
        Self {
            title: value.title,
            body: value.body,
        }
    }
}

/// Decode a remote message into a [`PushEnvelope`].
///
/// # Errors
///
/// Returns [`EnvelopeError::Malformed`] when `json` is not a remote message
/// object.
///
/// # Examples
///
/// ```
/// use momtn_push::inbound::fcm::parse_remote_message;
///
/// let envelope = parse_remote_message(r#"{"data":{"photoId":"p7","badge":3}}"#)?;
/// assert_eq!(envelope.fields().photo_id.as_deref(), Some("p7"));
/// assert_eq!(envelope.data.get("badge").map(String::as_str), Some("3"));
/// # Ok::<(), momtn_push::inbound::fcm::EnvelopeError>(())
/// ```
pub fn parse_remote_message(json: &str) -> Result<PushEnvelope, EnvelopeError> {
    let dto: RemoteMessageDto = serde_json::from_str(json)?;
    debug!(
        transport_message_id = dto.message_id.as_deref().unwrap_or_default(),
        "remote message decoded"
    );
    Ok(PushEnvelope {
        notification: dto.notification.map(NotificationBlock::from),
        data: stringify_values(dto.data),
    })
}

/// Decode a bare data map, as attached to a displayed notification.
///
/// # Errors
///
/// Returns [`EnvelopeError::Malformed`] when `json` is not an object.
pub fn parse_data_map(json: &str) -> Result<BTreeMap<String, String>, EnvelopeError> {
    let raw: BTreeMap<String, Value> = serde_json::from_str(json)?;
    Ok(stringify_values(raw))
}

fn stringify_values(raw: BTreeMap<String, Value>) -> BTreeMap<String, String> {
    raw.into_iter()
        .filter_map(|(key, value)| match value {
            Value::String(text) => Some((key, text)),
            Value::Number(number) => Some((key, number.to_string())),
            Value::Bool(flag) => Some((key, flag.to_string())),
            Value::Null | Value::Array(_) | Value::Object(_) => {
                debug!(key = %key, "dropping non-scalar data value");
                None
            }
        })
        .collect()
}
