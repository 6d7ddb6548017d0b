//! Scan orchestration across every registered spec.
//!
//! Specs are processed one after another in registry listing order. A failure
//! on any spec aborts the whole run; no partial report is produced.

use crate::error::ServiceResult;
use crate::registry::SpecRegistry;
use crate::scanner::{ScanApi, ScanDriver, ScanMode};
use crate::storage::BlobStore;
use crate::types::{Level, ScanSpec, SeverityCounts, SpecId, TagResults};
use serde::Serialize;
use std::fmt::Write as _;
use tracing::info;

/// One spec together with its per-tag results.
#[derive(Debug, Clone, Serialize)]
pub struct SpecScan {
    pub spec: ScanSpec,
    pub results: TagResults,
}

/// One line of the findings summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryEntry {
    pub id: SpecId,
    pub repository: String,
    pub region: String,
    pub tag: String,
    pub level: Level,
    pub counts: SeverityCounts,
}

/// Severity breakdown of every scanned tag of every spec.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Summary {
    pub entries: Vec<SummaryEntry>,
}

impl Summary {
    /// Flatten scan results into summary entries, applying each spec's level.
    pub fn from_scans(scans: &[SpecScan]) -> Self {
        let mut entries = Vec::new();

        for scan in scans {
            let level = scan.spec.level();

            for (tag, result) in &scan.results {
                let Some(findings) = result.findings() else {
                    continue;
                };

                entries.push(SummaryEntry {
                    id: scan.spec.id,
                    repository: scan.spec.repository.clone(),
                    region: scan.spec.region.clone(),
                    tag: tag.clone(),
                    level,
                    counts: findings.counts_where(|s| level.includes(s)),
                });
            }
        }

        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render the summary as text, one block per scanned tag.
    pub fn render(&self) -> String {
        let mut out = String::new();

        for entry in &self.entries {
            let _ = write!(
                out,
                "Results for {}:{} in {}:\n{}\n\n",
                entry.repository,
                entry.tag,
                entry.region,
                format_counts(&entry.counts)
            );
        }

        out
    }
}

/// Format severity counts, most severe first: `{HIGH: 2, LOW: 1}`.
pub fn format_counts(counts: &SeverityCounts) -> String {
    let parts: Vec<String> = counts
        .iter()
        .rev()
        .map(|(severity, count)| format!("{}: {}", severity, count))
        .collect();

    format!("{{{}}}", parts.join(", "))
}

/// Runs the scan driver over the specs in a registry.
pub struct Orchestrator<B, A> {
    registry: SpecRegistry<B>,
    driver: ScanDriver<A>,
}

impl<B: BlobStore, A: ScanApi> Orchestrator<B, A> {
    pub fn new(registry: SpecRegistry<B>, driver: ScanDriver<A>) -> Self {
        Self { registry, driver }
    }

    pub fn registry(&self) -> &SpecRegistry<B> {
        &self.registry
    }

    pub fn driver(&self) -> &ScanDriver<A> {
        &self.driver
    }

    /// Scan every registered spec in `mode`.
    pub async fn run_all(&self, mode: ScanMode) -> ServiceResult<Vec<SpecScan>> {
        let specs = self.registry.list().await?;
        let mut scans = Vec::with_capacity(specs.len());

        for spec in specs {
            let results = self.driver.run_scan(&spec, mode).await.into_result()?;
            scans.push(SpecScan { spec, results });
        }

        info!(specs = scans.len(), mode = %mode, "orchestration run complete");
        Ok(scans)
    }

    /// Start scans for every tag of every spec. Returns the number started.
    pub async fn trigger_all(&self) -> ServiceResult<usize> {
        let scans = self.run_all(ScanMode::Trigger).await?;
        Ok(scans.iter().map(|s| s.results.len()).sum())
    }

    /// Collect findings for every spec into a summary.
    pub async fn summary(&self) -> ServiceResult<Summary> {
        let scans = self.run_all(ScanMode::Describe).await?;
        Ok(Summary::from_scans(&scans))
    }

    /// Describe the findings of a single spec.
    pub async fn findings(&self, id: &SpecId) -> ServiceResult<SpecScan> {
        let spec = self.registry.get(id).await?;
        let results = self
            .driver
            .run_scan(&spec, ScanMode::Describe)
            .await
            .into_result()?;

        Ok(SpecScan { spec, results })
    }
}
