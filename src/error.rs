//! Error types for scanward.
//!
//! Uses `thiserror` for ergonomic error definitions. Each layer has its own
//! error type; [`ServiceError`] is the taxonomy surfaced to callers of the
//! registry, the scan driver and the orchestrator.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from a blob store backend.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("object not found: {0}")]
    NotFound(String),

    #[error("failed to write {key}: {reason}")]
    WriteFailed { key: String, reason: String },

    #[error("failed to read {key}: {reason}")]
    ReadFailed { key: String, reason: String },

    #[error("failed to list objects: {0}")]
    ListFailed(String),

    #[error("failed to delete {key}: {reason}")]
    DeleteFailed { key: String, reason: String },

    #[error("unexpected object key: {0}")]
    InvalidKey(String),
}

/// Errors from the external registry scan API.
#[derive(Error, Debug)]
pub enum ScanApiError {
    #[error("listing images of {repository} failed: {reason}")]
    ListImages { repository: String, reason: String },

    #[error("starting scan of {repository}:{tag} failed: {reason}")]
    StartScan {
        repository: String,
        tag: String,
        reason: String,
    },

    #[error("describing findings of {repository}:{tag} failed: {reason}")]
    DescribeFindings {
        repository: String,
        tag: String,
        reason: String,
    },

    #[error("no scan findings returned for {repository}:{tag}")]
    MissingFindings { repository: String, tag: String },
}

/// Error taxonomy of the core operations.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("scan spec not found: {0}")]
    NotFound(String),

    #[error("invalid request: {0}")]
    Validation(String),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    ExternalApi(#[from] ScanApiError),

    #[error("malformed scan spec JSON: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ServiceError {
    /// Whether this error denotes an unknown scan spec.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not determine configuration directory")]
    DirectoryNotFound,

    #[error("failed to read {path}: {reason}")]
    ReadFailed { path: PathBuf, reason: String },

    #[error("invalid settings file: {0}")]
    InvalidFormat(String),

    #[error("missing setting: {0}")]
    Missing(&'static str),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors while rendering the findings feed.
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("failed to write feed XML: {0}")]
    Xml(String),

    #[error("feed is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

/// Errors surfaced by CLI commands.
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Feed(#[from] FeedError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Result type alias for scan API calls.
pub type ScanApiResult<T> = Result<T, ScanApiError>;

/// Result type alias for core operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type alias for CLI commands.
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_converts_to_service_error() {
        let err: ServiceError = StorageError::ListFailed("bucket gone".into()).into();
        assert!(matches!(err, ServiceError::Storage(_)));
        assert_eq!(err.to_string(), "failed to list objects: bucket gone");
    }

    #[test]
    fn test_not_found_detection() {
        assert!(ServiceError::NotFound("abc".into()).is_not_found());
        assert!(!ServiceError::Validation("abc".into()).is_not_found());
    }
}
