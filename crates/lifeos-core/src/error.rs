//! Core error types for lifeos-core.
//!
//! This module defines the error hierarchy shared by the schedulers,
//! the state stores and the task sink, built with thiserror.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for lifeos-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// External task sink errors
    #[error("Task sink error: {0}")]
    Sink(#[from] SinkError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The watched root, or a document under it, could not be walked or read
    #[error("Failed to scan {path}: {message}")]
    Scan { path: PathBuf, message: String },

    /// Failed to persist state
    #[error("Failed to write state to {path}: {source}")]
    StateWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
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

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Data directory could not be resolved or created
    #[error("Failed to access data directory {path}: {message}")]
    DataDir { path: PathBuf, message: String },
}

/// Errors reported by an external task sink.
#[derive(Error, Debug)]
pub enum SinkError {
    /// No credentials stored for the service
    #[error("Not authenticated with {service}")]
    NotAuthenticated { service: String },

    /// Transport-level failure (DNS, TLS, connection reset ...)
    #[error("Request to {service} failed: {message}")]
    Transport { service: String, message: String },

    /// The service answered with a non-success status
    #[error("{service} API error (HTTP {status}): {body}")]
    Api {
        service: String,
        status: u16,
        body: String,
    },

    /// The response body did not have the expected shape
    #[error("Unexpected response from {service}: {message}")]
    Decode { service: String, message: String },

    /// Credential storage failure
    #[error("Credential store error: {0}")]
    Keyring(String),
}

/// Validation errors.
#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    /// Quality grade outside 0..=5
    #[error("Quality must be between 0 and 5, got {0}")]
    QualityOutOfRange(u8),

    /// Empty collection
    #[error("Empty collection: {0}")]
    EmptyCollection(String),

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

impl From<keyring::Error> for SinkError {
    fn from(err: keyring::Error) -> Self {
        SinkError::Keyring(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
