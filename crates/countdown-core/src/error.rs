//! Core error types for countdown-core.
//!
//! Timer validation failures, configuration failures and an umbrella
//! [`CoreError`] that every CLI command returns.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for countdown-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Timer action rejected
    #[error("Timer error: {0}")]
    Timer(#[from] TimerError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Rejections returned synchronously by timer actions.
///
/// None of these are fatal; the caller is expected to retry with corrected
/// input.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerError {
    /// `configure` called with a zero total or a seconds part above 59
    #[error("invalid duration {minutes}m {seconds}s: total must be positive and seconds at most 59")]
    InvalidDuration { minutes: u32, seconds: u32 },

    /// `start` called with no remaining time
    #[error("timer has no remaining time; configure or reset it first")]
    NotReady,

    /// `reset` called before any duration was configured
    #[error("timer has not been configured")]
    NotConfigured,

    /// Duration changes are refused while counting down
    #[error("timer is running; pause it before changing the duration")]
    Running,

    /// The service task owning the engine has exited
    #[error("timer service has stopped")]
    ServiceStopped,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Key does not exist in the configuration tree
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    /// Home/config directory could not be prepared
    #[error("Configuration directory unavailable: {0}")]
    DirUnavailable(#[source] std::io::Error),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseFailed(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
