//! Core error types for healthquest-core.
//!
//! This module defines the error hierarchy using thiserror. Only storage
//! faults and validation failures are meant to reach the user; ledger and
//! insight errors are absorbed by the mirror and the insight fallback.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for healthquest-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Key-value storage errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Remote ledger errors
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// Insight provider errors
    #[error("Insight error: {0}")]
    Insight(#[from] InsightError),

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

/// Key-value store errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open the backing database
    #[error("Failed to open store at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Read or write failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Value could not be serialized for writing
    #[error("Failed to serialize value for '{key}': {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Store refused the write (quota, read-only, injected fault)
    #[error("Write rejected for '{key}': {reason}")]
    WriteRejected { key: String, reason: String },

    /// Database is locked
    #[error("Store is locked")]
    Locked,
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
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// Validation errors for externally supplied input.
#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    /// Input was not a JSON object
    #[error("Expected a JSON object, got {0}")]
    NotAnObject(String),

    /// Required field missing
    #[error("Missing required field '{0}'")]
    MissingField(String),

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Remote ledger errors.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// No wallet/contract session configured
    #[error("Ledger session is not active")]
    NotConnected,

    /// Transport failure talking to the RPC endpoint
    #[error("RPC transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// JSON-RPC error object returned by the node
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// Response did not have the expected shape
    #[error("Unexpected RPC response: {0}")]
    InvalidResponse(String),

    /// Configured address was malformed
    #[error("Invalid address '{0}'")]
    InvalidAddress(String),

    /// Submission did not finish in time
    #[error("Ledger call timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// Client does not implement this contract call
    #[error("Ledger operation '{0}' is not supported by this client")]
    Unsupported(String),
}

/// Insight provider errors.
#[derive(Error, Debug)]
pub enum InsightError {
    /// Provider is not configured (missing key, disabled)
    #[error("Insight provider unavailable: {0}")]
    Unavailable(String),

    /// Transport failure
    #[error("Insight request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Provider returned content that is not a valid insight list
    #[error("Malformed insight response: {0}")]
    Malformed(String),
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(err, _msg) => {
                if err.code == rusqlite::ErrorCode::DatabaseLocked {
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

impl From<Box<dyn std::error::Error + Send + Sync>> for CoreError {
    fn from(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        CoreError::Custom(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
