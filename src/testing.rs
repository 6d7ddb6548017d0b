//! Test doubles shared by the unit tests.

use crate::error::{ScanApiError, ScanApiResult};
use crate::scanner::ScanApi;
use crate::types::{
    Finding, ImageFindings, ImageId, RepositoryRef, ScanAck, ScanRequest, ScanSpec, Severity,
    SpecId,
};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use std::sync::Mutex;

/// A spec for `123/app` in `us-west-2` with the given tags.
pub fn spec_with_tags(tags: &[&str]) -> ScanSpec {
    ScanRequest::new("us-west-2", "123", "app")
        .with_tags(tags.iter().copied())
        .into_spec(SpecId::new(), "1700000000".to_string())
}

/// Findings with one HIGH and two LOW vulnerabilities.
pub fn sample_findings() -> ImageFindings {
    ImageFindings {
        completed_at: Utc.timestamp_opt(1_700_000_000, 0).single(),
        severity_counts: [(Severity::High, 1), (Severity::Low, 2)].into_iter().collect(),
        findings: vec![Finding {
            name: "CVE-2024-0001".to_string(),
            description: "Heap overflow in libexample".to_string(),
            uri: "https://security-tracker.example/CVE-2024-0001".to_string(),
            severity: Severity::High,
        }],
    }
}

/// Scan API stub with a fixed image listing.
///
/// Records every per-image call before answering, so a failing call is
/// counted too.
pub struct StubScanApi {
    images: Vec<ImageId>,
    fail_tag: Option<String>,
    fail_list: bool,
    list_calls: Mutex<usize>,
    scanned: Mutex<Vec<ImageId>>,
}

impl StubScanApi {
    pub fn with_tags<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_images(tags.into_iter().map(ImageId::tagged).collect())
    }

    pub fn with_images(images: Vec<ImageId>) -> Self {
        Self {
            images,
            fail_tag: None,
            fail_list: false,
            list_calls: Mutex::new(0),
            scanned: Mutex::new(Vec::new()),
        }
    }

    /// Fail every per-image call for `tag`.
    pub fn failing_on(mut self, tag: &str) -> Self {
        self.fail_tag = Some(tag.to_string());
        self
    }

    /// Fail the image listing.
    pub fn failing_list(mut self) -> Self {
        self.fail_list = true;
        self
    }

    pub fn list_calls(&self) -> usize {
        *self.list_calls.lock().unwrap()
    }

    /// Images passed to per-image calls, in call order.
    pub fn scanned(&self) -> Vec<ImageId> {
        self.scanned.lock().unwrap().clone()
    }

    fn record(&self, image: &ImageId) -> Option<String> {
        self.scanned.lock().unwrap().push(image.clone());
        let tag = image.tag.clone().unwrap_or_default();
        (self.fail_tag.as_deref() == Some(tag.as_str())).then_some(tag)
    }
}

#[async_trait]
impl ScanApi for StubScanApi {
    async fn list_images(&self, target: &RepositoryRef) -> ScanApiResult<Vec<ImageId>> {
        *self.list_calls.lock().unwrap() += 1;

        if self.fail_list {
            return Err(ScanApiError::ListImages {
                repository: target.repository.clone(),
                reason: "RepositoryNotFoundException".to_string(),
            });
        }

        Ok(self.images.clone())
    }

    async fn start_scan(&self, target: &RepositoryRef, image: &ImageId) -> ScanApiResult<ScanAck> {
        if let Some(tag) = self.record(image) {
            return Err(ScanApiError::StartScan {
                repository: target.repository.clone(),
                tag,
                reason: "ImageNotFoundException".to_string(),
            });
        }

        Ok(ScanAck {
            status: "IN_PROGRESS".to_string(),
            description: None,
            image_digest: image.digest.clone(),
        })
    }

    async fn describe_findings(
        &self,
        target: &RepositoryRef,
        image: &ImageId,
    ) -> ScanApiResult<ImageFindings> {
        if let Some(tag) = self.record(image) {
            return Err(ScanApiError::DescribeFindings {
                repository: target.repository.clone(),
                tag,
                reason: "ScanNotFoundException".to_string(),
            });
        }

        Ok(sample_findings())
    }
}
