//! Core error types for studyplan-core.
//!
//! The scoring, scheduling and aggregation functions never fail: missing
//! reference data and empty inputs degrade to neutral values. Errors here
//! cover the storage layer and configuration. Per-course readiness failures are
//! reported in-band as [`ReadinessError`] values, never raised.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for studyplan-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Storage-related errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

/// Storage-specific errors (dataset file and plan history database).
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,

    /// Dataset file could not be read or parsed
    #[error("Failed to load dataset from {path}: {message}")]
    DatasetLoad { path: PathBuf, message: String },

    /// Dataset file could not be written
    #[error("Failed to save dataset to {path}: {message}")]
    DatasetSave { path: PathBuf, message: String },

    /// Data directory could not be resolved or created
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
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

    /// Unknown dot-path key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Referenced entity does not exist in the dataset
    #[error("{kind} '{id}' not found")]
    NotFound { kind: &'static str, id: String },
}

/// Per-course readiness failures.
///
/// Reported alongside the course id so that one bad course never aborts
/// scoring of the others.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReadinessError {
    /// Course has no exam date, so pacing cannot be projected
    #[error("course '{course_id}' has no exam date")]
    MissingExamDate { course_id: String },
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _msg) => {
                if e.code == rusqlite::ErrorCode::DatabaseLocked {
                    StorageError::Locked
                } else {
                    StorageError::QueryFailed(err.to_string())
                }
            }
            _ => StorageError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Storage(err.into())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
