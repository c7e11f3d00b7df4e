//! Core error types for lectern-core.
//!
//! Only structurally unexpected conditions surface as errors: a storage
//! write failing mid-mutation, an unreadable config file. Permission
//! denials, absent capabilities, duplicate adds and stale timers are all
//! handled locally by the component that encounters them and never reach
//! the caller.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for lectern-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Reminder store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Reminder-store specific errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Rewriting the persisted blob failed mid-mutation.
    #[error("Failed to persist reminders to {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Serializing the reminder blob failed.
    #[error("Failed to serialize reminders: {0}")]
    Serialize(#[from] serde_json::Error),
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
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
