//! Push pipeline configuration loaded via OrthoConfig.

use std::path::PathBuf;
use std::str::FromStr;

use camino::Utf8PathBuf;
use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;

use crate::domain::{
    DEFAULT_BODY, DEFAULT_CHANNEL_ID, DEFAULT_CHANNEL_NAME, DEFAULT_OPEN_ACTION_TITLE,
    DEFAULT_TITLE, PresentationSettings,
};

const DEFAULT_STORE_DIR: &str = ".momtn-push";

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per event.
    #[default]
    Json,
    /// Human-readable lines.
    Pretty,
}

impl FromStr for LogFormat {
    type Err = SettingsError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" | "text" => Ok(Self::Pretty),
            _ => Err(SettingsError::InvalidLogFormat {
                value: value.to_owned(),
            }),
        }
    }
}

/// Errors raised when settings values cannot be interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    /// `log_format` is neither `json` nor `pretty`.
    #[error("unsupported log format '{value}'; expected 'json' or 'pretty'")]
    InvalidLogFormat {
        /// Rejected value.
        value: String,
    },
    /// `store_dir` is not valid UTF-8.
    #[error("store directory is not valid UTF-8: {path}")]
    NonUtf8StoreDir {
        /// Lossy rendering of the path.
        path: String,
    },
}

/// Configuration for the push pipeline and its operator CLI.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "MOMTN_PUSH")]
pub struct PushSettings {
    /// Directory holding the durable key-value store.
    pub store_dir: Option<PathBuf>,
    /// Notification channel identifier.
    pub channel_id: Option<String>,
    /// Notification channel display name.
    pub channel_name: Option<String>,
    /// Fallback notification title.
    pub default_title: Option<String>,
    /// Fallback notification body.
    pub default_body: Option<String>,
    /// Label of the "open" action button.
    pub open_action_title: Option<String>,
    /// Log output format, `json` or `pretty`.
    pub log_format: Option<String>,
}

impl PushSettings {
    /// Return the store directory, falling back to the default.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::NonUtf8StoreDir`] for non UTF-8 paths.
    pub fn store_dir(&self) -> Result<Utf8PathBuf, SettingsError> {
        let Some(path) = self.store_dir.clone() else {
            return Ok(Utf8PathBuf::from(DEFAULT_STORE_DIR));
        };
        Utf8PathBuf::from_path_buf(path).map_err(|path| SettingsError::NonUtf8StoreDir {
            path: path.to_string_lossy().into_owned(),
        })
    }

    /// Return the configured log format, falling back to JSON.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidLogFormat`] for unknown values.
    pub fn log_format(&self) -> Result<LogFormat, SettingsError> {
        self.log_format
            .as_deref()
            .map_or(Ok(LogFormat::default()), LogFormat::from_str)
    }

    /// Presentation settings with every unset field defaulted.
    #[must_use]
    pub fn presentation(&self) -> PresentationSettings {
        let pick = |value: &Option<String>, fallback: &str| {
            value
                .as_deref()
                .filter(|text| !text.trim().is_empty())
                .unwrap_or(fallback)
                .to_owned()
        };
        PresentationSettings {
            channel_id: pick(&self.channel_id, DEFAULT_CHANNEL_ID),
            channel_name: pick(&self.channel_name, DEFAULT_CHANNEL_NAME),
            default_title: pick(&self.default_title, DEFAULT_TITLE),
            default_body: pick(&self.default_body, DEFAULT_BODY),
            open_action_title: pick(&self.open_action_title, DEFAULT_OPEN_ACTION_TITLE),
        }
    }
}
