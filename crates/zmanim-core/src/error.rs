//! Core error types for zmanim-core.
//!
//! The hierarchy follows the failure taxonomy of the service: configuration
//! errors are fatal at startup, everything else is recovered from by the
//! scheduler and only logged.

use std::path::PathBuf;
use thiserror::Error;

use crate::label::UnknownLabel;

/// Core error type for zmanim-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Time-point source errors
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Notification or state sink errors
    #[error("Delivery error: {0}")]
    Delivery(#[from] DeliveryError),

    /// Halachic clock errors
    #[error("Clock error: {0}")]
    Clock(#[from] ClockError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors. Always a deployment defect.
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

    /// A table names a label outside the enumeration
    #[error("Unknown label in '{table}': {source}")]
    UnknownLabel {
        table: &'static str,
        #[source]
        source: UnknownLabel,
    },

    /// Sunrise and sunset leave no daylight to divide
    #[error(transparent)]
    Daylight(#[from] ClockError),
}

/// Failures of the time-point source.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Request to time-service failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Time-service returned HTTP {status}")]
    Status { status: u16 },

    #[error("Malformed time-service body: {0}")]
    Malformed(String),

    #[error("Failed to read times file {path}: {source}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Time-service did not answer within {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },
}

/// Failures of the notification or persistence sinks.
#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("Webhook URL not configured")]
    NotConfigured,

    #[error("Webhook request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Webhook returned HTTP {status}")]
    Status { status: u16 },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode record: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Sink did not answer within {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },
}

/// Halachic clock errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClockError {
    #[error("Degenerate daylight: sunset ({sunset}) must be after sunrise ({sunrise})")]
    DegenerateDaylight {
        sunrise: chrono::DateTime<chrono::Utc>,
        sunset: chrono::DateTime<chrono::Utc>,
    },
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
