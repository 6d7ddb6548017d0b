//! Per-image scan results returned by the registry scan API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Severity of a scan finding, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Informational,
    Undefined,
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// The API's name for this severity.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Informational => "INFORMATIONAL",
            Self::Undefined => "UNDEFINED",
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = std::convert::Infallible;

    /// Unknown names map to `Undefined`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_uppercase().as_str() {
            "INFORMATIONAL" => Self::Informational,
            "LOW" => Self::Low,
            "MEDIUM" => Self::Medium,
            "HIGH" => Self::High,
            "CRITICAL" => Self::Critical,
            _ => Self::Undefined,
        })
    }
}

/// Severity to count mapping.
pub type SeverityCounts = BTreeMap<Severity, u64>;

/// A single vulnerability reported for an image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// Vulnerability name (usually a CVE identifier).
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Reference link for the vulnerability.
    #[serde(default)]
    pub uri: String,
    pub severity: Severity,
}

/// Scan findings for one image.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageFindings {
    /// When the scan completed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    pub severity_counts: SeverityCounts,
    pub findings: Vec<Finding>,
}

impl ImageFindings {
    /// Total number of findings across all severities.
    pub fn total(&self) -> u64 {
        self.severity_counts.values().sum()
    }

    /// Severity counts restricted to the severities `keep` accepts.
    pub fn counts_where(&self, keep: impl Fn(Severity) -> bool) -> SeverityCounts {
        self.severity_counts
            .iter()
            .filter(|(severity, _)| keep(**severity))
            .map(|(severity, count)| (*severity, *count))
            .collect()
    }
}

/// Acknowledgement of a started scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanAck {
    /// Status reported by the API, e.g. `IN_PROGRESS`.
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_digest: Option<String>,
}

/// The outcome of one per-tag scan API call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TagResult {
    /// A scan was started.
    Triggered(ScanAck),
    /// Findings were retrieved.
    Findings(ImageFindings),
}

impl TagResult {
    /// The findings, if this result carries any.
    pub fn findings(&self) -> Option<&ImageFindings> {
        match self {
            Self::Findings(findings) => Some(findings),
            Self::Triggered(_) => None,
        }
    }
}

/// Per-tag results of one scan run, keyed by tag name.
pub type TagResults = BTreeMap<String, TagResult>;

/// Identifies an image within a repository.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageId {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

impl ImageId {
    /// An image identified by tag only.
    pub fn tagged(tag: impl Into<String>) -> Self {
        Self {
            tag: Some(tag.into()),
            digest: None,
        }
    }

    /// Attach a digest.
    pub fn with_digest(mut self, digest: impl Into<String>) -> Self {
        self.digest = Some(digest.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Critical > Severity::High);
        assert!(Severity::High > Severity::Medium);
        assert!(Severity::Low > Severity::Undefined);
        assert!(Severity::Undefined > Severity::Informational);
    }

    #[test]
    fn test_severity_from_str() {
        assert_eq!("high".parse::<Severity>().unwrap(), Severity::High);
        assert_eq!("CRITICAL".parse::<Severity>().unwrap(), Severity::Critical);
        assert_eq!("bogus".parse::<Severity>().unwrap(), Severity::Undefined);
    }

    #[test]
    fn test_counts_where() {
        let findings = ImageFindings {
            completed_at: None,
            severity_counts: [(Severity::High, 2), (Severity::Low, 5), (Severity::Critical, 1)]
                .into_iter()
                .collect(),
            findings: Vec::new(),
        };

        assert_eq!(findings.total(), 8);
        let severe = findings.counts_where(|s| s >= Severity::High);
        assert_eq!(severe.len(), 2);
        assert_eq!(severe[&Severity::High], 2);
    }

    #[test]
    fn test_tag_result_serialization() {
        let ack = TagResult::Triggered(ScanAck {
            status: "IN_PROGRESS".into(),
            description: None,
            image_digest: None,
        });
        let json = serde_json::to_value(&ack).unwrap();
        assert_eq!(json["kind"], "triggered");
        assert_eq!(json["status"], "IN_PROGRESS");
    }
}
