//! Application configuration value object

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::domain::recording::Duration;

/// Application configuration.
/// All fields are optional to support partial configs and merging.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Longest a single recording may run before it is stopped automatically
    pub max_duration: Option<String>,
    /// Also show desktop notifications
    pub notify: Option<bool>,
    /// Where recordings are persisted
    pub data_dir: Option<String>,
}

impl AppConfig {
    /// Create config with default values
    pub fn defaults() -> Self {
        Self {
            max_duration: Some(Duration::default_max_duration().to_string()),
            notify: Some(false),
            data_dir: None,
        }
    }

    /// Create an empty config (all None)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Merge this config with another, where other takes precedence.
    /// Only non-None values from other will override this.
    pub fn merge(self, other: AppConfig) -> AppConfig {
        AppConfig {
            max_duration: other.max_duration.or(self.max_duration),
            notify: other.notify.or(self.notify),
            data_dir: other.data_dir.or(self.data_dir),
        }
    }

    /// Get max_duration as parsed Duration, or default if not set/invalid
    pub fn max_duration_or_default(&self) -> Duration {
        self.max_duration
            .as_ref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(Duration::default_max_duration)
    }

    /// Get notify setting, or false if not set
    pub fn notify_or_default(&self) -> bool {
        self.notify.unwrap_or(false)
    }

    /// Get the data directory, falling back to the platform data dir
    pub fn data_dir_or_default(&self) -> PathBuf {
        match self.data_dir.as_deref() {
            Some(dir) if !dir.trim().is_empty() => PathBuf::from(dir),
            _ => dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("voice-notes"),
        }
    }
}
