//! Configuration management for scanward.
//!
//! Components never read the environment themselves. The CLI merges the
//! settings file, environment and flags into a [`ServiceConfig`] and hands it
//! to the constructors.

mod settings;

pub use settings::{AppSettings, Paths};

use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Environment variable naming the bucket that backs the registry.
pub const BUCKET_ENV: &str = "ECR_SCAN_CONFIG_BUCKET";

/// Where scan specs are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// An S3 bucket.
    #[default]
    S3,
    /// A local directory, one JSON file per spec.
    Local,
    /// Process memory; nothing is persisted.
    Memory,
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::S3 => write!(f, "s3"),
            Self::Local => write!(f, "local"),
            Self::Memory => write!(f, "memory"),
        }
    }
}

/// Resolved configuration for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub backend: StorageBackend,
    /// Bucket for the S3 backend.
    pub bucket: Option<String>,
    /// Directory for the local backend; the XDG data directory if unset.
    pub store_dir: Option<PathBuf>,
    pub ecr_endpoint: Option<String>,
}

impl ServiceConfig {
    /// Start from persisted settings.
    pub fn from_settings(settings: &AppSettings) -> Self {
        Self {
            backend: settings.backend,
            bucket: settings.bucket.clone(),
            store_dir: settings.store_dir.clone(),
            ecr_endpoint: settings.ecr_endpoint.clone(),
        }
    }

    pub fn with_backend(mut self, backend: Option<StorageBackend>) -> Self {
        if let Some(backend) = backend {
            self.backend = backend;
        }
        self
    }

    pub fn with_bucket(mut self, bucket: Option<String>) -> Self {
        if bucket.is_some() {
            self.bucket = bucket;
        }
        self
    }

    pub fn with_store_dir(mut self, dir: Option<PathBuf>) -> Self {
        if dir.is_some() {
            self.store_dir = dir;
        }
        self
    }

    pub fn with_ecr_endpoint(mut self, endpoint: Option<String>) -> Self {
        if endpoint.is_some() {
            self.ecr_endpoint = endpoint;
        }
        self
    }

    /// Check that the chosen backend has what it needs.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.backend == StorageBackend::S3
            && self.bucket.as_deref().map_or(true, |b| b.trim().is_empty())
        {
            return Err(ConfigError::Missing(
                "bucket (set --bucket or ECR_SCAN_CONFIG_BUCKET)",
            ));
        }
        Ok(())
    }
}
