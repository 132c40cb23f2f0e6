//! Error types for metabackup
//!
//! Centralized error handling using thiserror.

use thiserror::Error;

use crate::domain::ProcessId;

/// All error types that can occur in metabackup
#[derive(Debug, Error)]
pub enum MetaBackupError {
    /// Process id unknown to the process store
    #[error("Process not found: {0}")]
    ProcessNotFound(ProcessId),

    /// A backup run is already in progress
    #[error("A backup run is already in progress")]
    AlreadyRunning,

    /// Filter resolution failed
    #[error("Filter error: {0}")]
    Filter(String),

    /// Process registry could not be read or parsed
    #[error("Registry error: {0}")]
    Registry(String),

    /// File storage operation failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// Background run task panicked or was aborted
    #[error("Task error: {0}")]
    Task(String),

    /// Configuration value out of range
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for metabackup operations
pub type Result<T> = std::result::Result<T, MetaBackupError>;
