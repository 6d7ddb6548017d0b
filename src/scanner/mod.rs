//! Scanner module - drives the registry scan API for scan specs.
//!
//! [`ScanApi`] abstracts the external scanning service, [`EcrScanApi`] talks
//! to Amazon ECR, and [`ScanDriver`] runs one spec's scan across its tags.

pub mod driver;
pub mod ecr;
pub mod traits;

pub use driver::{ResolvedTag, ScanDriver, ScanOutcome, TagSet, TagSource};
pub use ecr::EcrScanApi;
pub use traits::{BoxedScanApi, ScanApi, ScanMode};
