//! Core type definitions using newtype patterns for type safety.
//!
//! Scan specs, their identifiers, and the per-image results the scan API
//! reports.

mod findings;
mod spec;
mod spec_id;

pub use findings::{
    Finding, ImageFindings, ImageId, ScanAck, Severity, SeverityCounts, TagResult, TagResults,
};
pub use spec::{Level, RepositoryRef, ScanRequest, ScanSpec};
pub use spec_id::{SpecId, SpecIdError, SPEC_KEY_EXTENSION};
