//! Scan spec records and the requests that create them.

use super::{Severity, SpecId};
use serde::{de, Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Minimum severity a summary reports for a spec.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// HIGH and CRITICAL findings only.
    High,
    /// Every severity.
    #[default]
    All,
}

impl Level {
    /// Whether findings of `severity` are reported at this level.
    pub fn includes(self, severity: Severity) -> bool {
        match self {
            Self::High => severity >= Severity::High,
            Self::All => true,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::High => write!(f, "high"),
            Self::All => write!(f, "all"),
        }
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "high" => Ok(Self::High),
            "all" => Ok(Self::All),
            _ => Err(format!("unknown level: {}", s)),
        }
    }
}

/// Tags that may be stored as `null`.
fn nullable_tags<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// A level that may be stored as `null` or `""`, in any case.
fn optional_level<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Level>, D::Error> {
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) if !raw.trim().is_empty() => raw.parse().map(Some).map_err(de::Error::custom),
        _ => Ok(None),
    }
}

/// A persisted scan spec.
///
/// Identifies a container repository and the tags within it to scan. Specs
/// are immutable once created; replacing one means deleting and recreating it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanSpec {
    /// Unique identifier, assigned by the registry.
    pub id: SpecId,
    /// Creation time in seconds since the epoch, as text.
    pub created: String,
    /// Region the repository lives in.
    pub region: String,
    /// Registry (account) ID.
    #[serde(rename = "registry")]
    pub registry_id: String,
    /// Repository name.
    pub repository: String,
    /// Tags to scan. Empty means every tagged image.
    #[serde(default, deserialize_with = "nullable_tags")]
    pub tags: Vec<String>,
    /// Minimum severity reported in summaries.
    #[serde(
        default,
        deserialize_with = "optional_level",
        skip_serializing_if = "Option::is_none"
    )]
    pub level: Option<Level>,
}

impl ScanSpec {
    /// The repository this spec targets.
    pub fn target(&self) -> RepositoryRef {
        RepositoryRef {
            region: self.region.clone(),
            registry_id: self.registry_id.clone(),
            repository: self.repository.clone(),
        }
    }

    /// Whether this spec scans every tagged image in the repository.
    pub fn scans_all_tags(&self) -> bool {
        self.tags.is_empty()
    }

    /// The effective summary level.
    pub fn level(&self) -> Level {
        self.level.unwrap_or_default()
    }
}

/// Caller-supplied fields of a new scan spec.
///
/// `id` and `created` are not part of the request; if a body carries them
/// they are ignored and the registry assigns fresh values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanRequest {
    #[serde(default)]
    pub region: String,
    #[serde(rename = "registry", default)]
    pub registry_id: String,
    #[serde(default)]
    pub repository: String,
    #[serde(default, deserialize_with = "nullable_tags")]
    pub tags: Vec<String>,
    #[serde(
        default,
        deserialize_with = "optional_level",
        skip_serializing_if = "Option::is_none"
    )]
    pub level: Option<Level>,
}

impl ScanRequest {
    /// Create a request for every tag of a repository.
    pub fn new(
        region: impl Into<String>,
        registry_id: impl Into<String>,
        repository: impl Into<String>,
    ) -> Self {
        Self {
            region: region.into(),
            registry_id: registry_id.into(),
            repository: repository.into(),
            tags: Vec::new(),
            level: None,
        }
    }

    /// Restrict the request to the given tags.
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Set the summary level.
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = Some(level);
        self
    }

    /// Check that the repository coordinates are present.
    pub fn validate(&self) -> Result<(), String> {
        for (field, value) in [
            ("region", &self.region),
            ("registry", &self.registry_id),
            ("repository", &self.repository),
        ] {
            if value.trim().is_empty() {
                return Err(format!("{} must not be empty", field));
            }
        }

        if self.tags.iter().any(|t| t.trim().is_empty()) {
            return Err("tags must not contain empty names".to_string());
        }

        Ok(())
    }

    /// Turn the request into a spec with the given identity.
    pub fn into_spec(self, id: SpecId, created: String) -> ScanSpec {
        ScanSpec {
            id,
            created,
            region: self.region,
            registry_id: self.registry_id,
            repository: self.repository,
            tags: self.tags,
            level: self.level,
        }
    }
}

/// Coordinates of a container repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepositoryRef {
    pub region: String,
    pub registry_id: String,
    pub repository: String,
}

impl fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} ({})", self.registry_id, self.repository, self.region)
    }
}
