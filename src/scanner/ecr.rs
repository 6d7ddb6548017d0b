//! Amazon ECR implementation of the scan API.

use super::traits::ScanApi;
use crate::error::{ScanApiError, ScanApiResult};
use crate::types::{Finding, ImageFindings, ImageId, RepositoryRef, ScanAck, Severity};
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_ecr::config::Region;
use aws_sdk_ecr::error::DisplayErrorContext;
use aws_sdk_ecr::types::{ImageIdentifier, ListImagesFilter, TagStatus};
use aws_sdk_ecr::Client;
use chrono::{DateTime, Utc};
use tracing::debug;

/// ECR image scanning client.
///
/// Specs may target repositories in any region, so a client is built per
/// call for the target's region from the shared SDK configuration.
#[derive(Debug, Clone)]
pub struct EcrScanApi {
    sdk_config: SdkConfig,
    endpoint: Option<String>,
}

impl EcrScanApi {
    pub fn new(sdk_config: SdkConfig) -> Self {
        Self {
            sdk_config,
            endpoint: None,
        }
    }

    /// Send requests to a custom endpoint instead of the regional default.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    fn client(&self, region: &str) -> Client {
        let mut builder = aws_sdk_ecr::config::Builder::from(&self.sdk_config)
            .region(Region::new(region.to_string()));

        if let Some(ref endpoint) = self.endpoint {
            builder = builder.endpoint_url(endpoint);
        }

        Client::from_conf(builder.build())
    }
}

fn identifier(image: &ImageId) -> ImageIdentifier {
    ImageIdentifier::builder()
        .set_image_tag(image.tag.clone())
        .set_image_digest(image.digest.clone())
        .build()
}

fn tag_of(image: &ImageId) -> String {
    image
        .tag
        .clone()
        .or_else(|| image.digest.clone())
        .unwrap_or_default()
}

fn completed_at(value: &aws_sdk_ecr::primitives::DateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(value.secs(), value.subsec_nanos())
}

#[async_trait]
impl ScanApi for EcrScanApi {
    async fn list_images(&self, target: &RepositoryRef) -> ScanApiResult<Vec<ImageId>> {
        let client = self.client(&target.region);
        let filter = ListImagesFilter::builder()
            .tag_status(TagStatus::Tagged)
            .build();
        let mut images = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let page = client
                .list_images()
                .repository_name(&target.repository)
                .registry_id(&target.registry_id)
                .filter(filter.clone())
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(|e| ScanApiError::ListImages {
                    repository: target.repository.clone(),
                    reason: DisplayErrorContext(&e).to_string(),
                })?;

            images.extend(page.image_ids().iter().map(|id| ImageId {
                tag: id.image_tag().map(str::to_string),
                digest: id.image_digest().map(str::to_string),
            }));

            match page.next_token() {
                Some(token) => next_token = Some(token.to_string()),
                None => break,
            }
        }

        debug!(repository = %target.repository, count = images.len(), "listed tagged images");
        Ok(images)
    }

    async fn start_scan(&self, target: &RepositoryRef, image: &ImageId) -> ScanApiResult<ScanAck> {
        let output = self
            .client(&target.region)
            .start_image_scan()
            .repository_name(&target.repository)
            .registry_id(&target.registry_id)
            .image_id(identifier(image))
            .send()
            .await
            .map_err(|e| ScanApiError::StartScan {
                repository: target.repository.clone(),
                tag: tag_of(image),
                reason: DisplayErrorContext(&e).to_string(),
            })?;

        let status = output.image_scan_status();
        let ack = ScanAck {
            status: status
                .and_then(|s| s.status())
                .map(|s| s.as_str().to_string())
                .unwrap_or_else(|| "UNKNOWN".to_string()),
            description: status.and_then(|s| s.description()).map(str::to_string),
            image_digest: output
                .image_id()
                .and_then(|id| id.image_digest())
                .map(str::to_string),
        };

        debug!(
            repository = %target.repository,
            tag = %tag_of(image),
            status = %ack.status,
            "scan started"
        );
        Ok(ack)
    }

    async fn describe_findings(
        &self,
        target: &RepositoryRef,
        image: &ImageId,
    ) -> ScanApiResult<ImageFindings> {
        let client = self.client(&target.region);
        let mut result: Option<ImageFindings> = None;
        let mut next_token: Option<String> = None;

        loop {
            let page = client
                .describe_image_scan_findings()
                .repository_name(&target.repository)
                .registry_id(&target.registry_id)
                .image_id(identifier(image))
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(|e| ScanApiError::DescribeFindings {
                    repository: target.repository.clone(),
                    tag: tag_of(image),
                    reason: DisplayErrorContext(&e).to_string(),
                })?;

            let scan = page
                .image_scan_findings()
                .ok_or_else(|| ScanApiError::MissingFindings {
                    repository: target.repository.clone(),
                    tag: tag_of(image),
                })?;

            let findings = result.get_or_insert_with(|| ImageFindings {
                completed_at: scan.image_scan_completed_at().and_then(completed_at),
                severity_counts: scan
                    .finding_severity_counts()
                    .map(|counts| {
                        counts
                            .iter()
                            .map(|(severity, count)| {
                                let severity: Severity =
                                    severity.as_str().parse().unwrap_or(Severity::Undefined);
                                (severity, u64::try_from(*count).unwrap_or_default())
                            })
                            .collect()
                    })
                    .unwrap_or_default(),
                findings: Vec::new(),
            });

            findings.findings.extend(scan.findings().iter().map(|f| Finding {
                name: f.name().unwrap_or_default().to_string(),
                description: f.description().unwrap_or_default().to_string(),
                uri: f.uri().unwrap_or_default().to_string(),
                severity: f
                    .severity()
                    .map(|s| s.as_str().parse().unwrap_or(Severity::Undefined))
                    .unwrap_or(Severity::Undefined),
            }));

            match page.next_token() {
                Some(token) => next_token = Some(token.to_string()),
                None => break,
            }
        }

        let findings = result.unwrap_or_default();
        debug!(
            repository = %target.repository,
            tag = %tag_of(image),
            total = findings.total(),
            "described findings"
        );
        Ok(findings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_carries_tag_and_digest() {
        let id = identifier(&ImageId::tagged("latest").with_digest("sha256:abc"));
        assert_eq!(id.image_tag(), Some("latest"));
        assert_eq!(id.image_digest(), Some("sha256:abc"));
    }

    #[test]
    fn test_tag_of_falls_back_to_digest() {
        assert_eq!(tag_of(&ImageId::tagged("v1")), "v1");
        assert_eq!(tag_of(&ImageId::default().with_digest("sha256:1")), "sha256:1");
    }

    #[test]
    fn test_completed_at_conversion() {
        let value = aws_sdk_ecr::primitives::DateTime::from_secs(1_700_000_000);
        let converted = completed_at(&value).unwrap();
        assert_eq!(converted.timestamp(), 1_700_000_000);
    }
}
