//! Domain error types

use thiserror::Error;

/// A duration string that is not a positive mix of h, m and s units
#[derive(Debug, Clone, Error)]
#[error("Invalid duration \"{input}\": use whole numbers with h, m or s, largest unit first (e.g. 90s, 5m, 1h30m)")]
pub struct DurationParseError {
    pub input: String,
}

/// A finished capture was shorter than the minimum length worth keeping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Recording too short: {elapsed_secs}s (minimum {minimum_secs}s)")]
pub struct TooShortRecording {
    pub elapsed_secs: u32,
    pub minimum_secs: u32,
}

/// Error when a recording id string is not a valid identifier
#[derive(Debug, Clone, Error)]
#[error("Invalid recording id: \"{input}\"")]
pub struct InvalidRecordingId {
    pub input: String,
}

/// Error when configuration fails
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(String),

    #[error("Failed to parse config file: {0}")]
    ParseError(String),

    #[error("Failed to write config file: {0}")]
    WriteError(String),

    #[error("Invalid config value for '{key}': {message}")]
    ValidationError { key: String, message: String },

    #[error("Config file already exists at: {0}")]
    AlreadyExists(String),
}
