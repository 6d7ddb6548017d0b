//! Unique identifiers for scan specs.
//!
//! `SpecId` is the registry's identifier for a persisted [`ScanSpec`] and the
//! basis of its storage key.
//!
//! [`ScanSpec`]: super::ScanSpec

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Extension appended to a spec id to form its storage key.
pub const SPEC_KEY_EXTENSION: &str = ".json";

/// A unique identifier for a scan spec.
///
/// Uses UUID v4 internally, so concurrently created specs never collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpecId(Uuid);

impl SpecId {
    /// Generate a new random spec ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// The blob store key under which this spec is persisted.
    pub fn storage_key(&self) -> String {
        format!("{}{}", self.0, SPEC_KEY_EXTENSION)
    }

    /// Recover a spec ID from a blob store key.
    ///
    /// Returns `None` for keys that don't carry the spec extension, and an
    /// error for spec keys whose stem isn't a valid ID.
    pub fn from_storage_key(key: &str) -> Option<Result<Self, SpecIdError>> {
        key.strip_suffix(SPEC_KEY_EXTENSION).map(str::parse)
    }

    /// Get a short representation (first 8 characters).
    pub fn short(&self) -> String {
        self.0.to_string()[..8].to_string()
    }
}

impl Default for SpecId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SpecId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SpecId {
    type Err = SpecIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let uuid = Uuid::parse_str(s).map_err(|_| SpecIdError::InvalidFormat(s.to_string()))?;
        Ok(Self(uuid))
    }
}

/// Error type for SpecId parsing.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SpecIdError {
    #[error("invalid scan spec ID: {0}")]
    InvalidFormat(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_id_generation() {
        let id1 = SpecId::new();
        let id2 = SpecId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_spec_id_display() {
        let id = SpecId::new();
        assert_eq!(id.to_string().len(), 36);
        assert_eq!(id.short().len(), 8);
    }

    #[test]
    fn test_storage_key() {
        let id: SpecId = "0b8f6a2e-5c1d-4f7e-9a3b-2d4c6e8f0a1b".parse().unwrap();
        assert_eq!(id.storage_key(), "0b8f6a2e-5c1d-4f7e-9a3b-2d4c6e8f0a1b.json");

        let recovered = SpecId::from_storage_key(&id.storage_key()).unwrap().unwrap();
        assert_eq!(recovered, id);
    }

    #[test]
    fn test_foreign_keys() {
        assert!(SpecId::from_storage_key("README.txt").is_none());
        assert!(SpecId::from_storage_key("not-a-uuid.json").unwrap().is_err());
    }
}
