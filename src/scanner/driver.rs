//! Per-spec scan execution.
//!
//! A scan run has two steps: resolve the spec's tag set (the explicit list, or
//! every tagged image currently in the repository), then issue one scan API
//! call per tag. The first failing call ends the run with no partial results.

use super::traits::{ScanApi, ScanMode};
use crate::error::{ServiceError, ServiceResult};
use crate::types::{ImageId, ScanSpec, TagResult, TagResults};
use tracing::{debug, info};

/// Where a resolved tag set came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagSource {
    /// The spec's own tag list.
    Explicit,
    /// The repository's tagged images at resolution time.
    Listed,
}

/// A tag to scan and the image it identifies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTag {
    pub tag: String,
    pub image: ImageId,
}

/// The working set of one scan run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagSet {
    pub source: TagSource,
    pub tags: Vec<ResolvedTag>,
}

impl TagSet {
    /// A fixed tag set, identified by tag name only.
    pub fn explicit<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tags = tags
            .into_iter()
            .map(|tag| {
                let tag = tag.into();
                ResolvedTag {
                    image: ImageId::tagged(tag.clone()),
                    tag,
                }
            })
            .collect();

        Self {
            source: TagSource::Explicit,
            tags,
        }
    }

    /// Build a tag set from listed images, skipping untagged ones.
    pub fn listed(images: Vec<ImageId>) -> Self {
        let tags = images
            .into_iter()
            .filter_map(|image| {
                image.tag.clone().map(|tag| ResolvedTag { tag, image })
            })
            .collect();

        Self {
            source: TagSource::Listed,
            tags,
        }
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Tag names in call order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(|t| t.tag.as_str())
    }
}

/// Result of a scan run: every tag succeeded, or the run failed as a whole.
#[derive(Debug)]
pub enum ScanOutcome {
    Success(TagResults),
    Failure(ServiceError),
}

impl ScanOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Convert into a `Result`.
    pub fn into_result(self) -> ServiceResult<TagResults> {
        match self {
            Self::Success(results) => Ok(results),
            Self::Failure(err) => Err(err),
        }
    }
}

impl From<ServiceResult<TagResults>> for ScanOutcome {
    fn from(result: ServiceResult<TagResults>) -> Self {
        match result {
            Ok(results) => Self::Success(results),
            Err(err) => Self::Failure(err),
        }
    }
}

/// Runs scans for single specs against a scan API.
pub struct ScanDriver<A> {
    api: A,
}

impl<A: ScanApi> ScanDriver<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }

    /// The underlying scan API client.
    pub fn api(&self) -> &A {
        &self.api
    }

    /// Resolve the tags a spec covers.
    ///
    /// An empty tag list means every tagged image in the repository, listed
    /// from the API at call time. A non-empty list is used as given, without
    /// checking that the tags exist.
    pub async fn resolve(&self, spec: &ScanSpec) -> ServiceResult<TagSet> {
        if !spec.scans_all_tags() {
            debug!(repository = %spec.repository, tags = ?spec.tags, "using configured tags");
            return Ok(TagSet::explicit(spec.tags.iter().cloned()));
        }

        debug!(repository = %spec.repository, "listing all tagged images");
        let images = self.api.list_images(&spec.target()).await?;
        Ok(TagSet::listed(images))
    }

    /// Issue one API call per tag of `tags`, in order.
    pub async fn execute(&self, spec: &ScanSpec, tags: &TagSet, mode: ScanMode) -> ScanOutcome {
        self.collect(spec, tags, mode).await.into()
    }

    /// Resolve a spec's tags and scan them.
    pub async fn run_scan(&self, spec: &ScanSpec, mode: ScanMode) -> ScanOutcome {
        let tags = match self.resolve(spec).await {
            Ok(tags) => tags,
            Err(err) => return ScanOutcome::Failure(err),
        };

        let outcome = self.execute(spec, &tags, mode).await;
        if outcome.is_success() {
            info!(
                id = %spec.id,
                repository = %spec.repository,
                tags = tags.len(),
                mode = %mode,
                "scan run complete"
            );
        }
        outcome
    }

    async fn collect(
        &self,
        spec: &ScanSpec,
        tags: &TagSet,
        mode: ScanMode,
    ) -> ServiceResult<TagResults> {
        let target = spec.target();
        let mut results = TagResults::new();

        for resolved in &tags.tags {
            let result = match mode {
                ScanMode::Trigger => {
                    TagResult::Triggered(self.api.start_scan(&target, &resolved.image).await?)
                }
                ScanMode::Describe => TagResult::Findings(
                    self.api.describe_findings(&target, &resolved.image).await?,
                ),
            };

            debug!(repository = %spec.repository, tag = %resolved.tag, mode = %mode, "tag done");
            results.insert(resolved.tag.clone(), result);
        }

        Ok(results)
    }
}
