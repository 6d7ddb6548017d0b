//! Registry scan API abstraction.
//!
//! Defines the interface to the external image scanning service, so the scan
//! driver can run against ECR or a test double.

use crate::error::ScanApiResult;
use crate::types::{ImageFindings, ImageId, RepositoryRef, ScanAck};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// What a scan run does for each tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanMode {
    /// Start a new scan of the image.
    Trigger,
    /// Retrieve the findings of the latest scan.
    #[default]
    Describe,
}

impl fmt::Display for ScanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Trigger => write!(f, "trigger"),
            Self::Describe => write!(f, "describe"),
        }
    }
}

/// Trait for registry scan API clients.
///
/// Each method is one blocking round trip to the scanning service; callers
/// await each call before issuing the next.
///
/// # Example
///
/// ```ignore
/// use scanward::scanner::ScanApi;
/// use scanward::types::{ImageId, RepositoryRef};
///
/// async fn latest_findings<A: ScanApi>(api: &A, repo: &RepositoryRef) {
///     let findings = api.describe_findings(repo, &ImageId::tagged("latest")).await;
/// }
/// ```
#[async_trait]
pub trait ScanApi: Send + Sync {
    /// List the tagged images of a repository.
    async fn list_images(&self, target: &RepositoryRef) -> ScanApiResult<Vec<ImageId>>;

    /// Start a scan of one image.
    async fn start_scan(&self, target: &RepositoryRef, image: &ImageId) -> ScanApiResult<ScanAck>;

    /// Describe the findings of the latest scan of one image.
    async fn describe_findings(
        &self,
        target: &RepositoryRef,
        image: &ImageId,
    ) -> ScanApiResult<ImageFindings>;
}

#[async_trait]
impl<T: ScanApi + ?Sized> ScanApi for Arc<T> {
    async fn list_images(&self, target: &RepositoryRef) -> ScanApiResult<Vec<ImageId>> {
        (**self).list_images(target).await
    }

    async fn start_scan(&self, target: &RepositoryRef, image: &ImageId) -> ScanApiResult<ScanAck> {
        (**self).start_scan(target, image).await
    }

    async fn describe_findings(
        &self,
        target: &RepositoryRef,
        image: &ImageId,
    ) -> ScanApiResult<ImageFindings> {
        (**self).describe_findings(target, image).await
    }
}

/// A boxed scan API client for dynamic dispatch.
pub type BoxedScanApi = Box<dyn ScanApi>;

#[async_trait]
impl<T: ScanApi + ?Sized> ScanApi for Box<T> {
    async fn list_images(&self, target: &RepositoryRef) -> ScanApiResult<Vec<ImageId>> {
        (**self).list_images(target).await
    }

    async fn start_scan(&self, target: &RepositoryRef, image: &ImageId) -> ScanApiResult<ScanAck> {
        (**self).start_scan(target, image).await
    }

    async fn describe_findings(
        &self,
        target: &RepositoryRef,
        image: &ImageId,
    ) -> ScanApiResult<ImageFindings> {
        (**self).describe_findings(target, image).await
    }
}
