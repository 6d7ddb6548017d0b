//! # Scanward - Scan Spec Registry for Container Images
//!
//! Scanward keeps a registry of scan specs, each naming a container image
//! repository (region, registry and repository) and the tags to scan, and
//! drives the registry's vulnerability scan API over them.
//!
//! ## Features
//!
//! - **Spec Registry**: Create, list, fetch and delete specs in S3, a local
//!   directory or memory
//! - **Scan Driver**: Start scans or describe findings for every tag of a spec,
//!   stopping at the first failure
//! - **Orchestration**: Trigger all specs on a schedule and summarize findings
//! - **Request Envelope**: Transport-agnostic handlers with HTTP-style statuses
//! - **Multiple Output Formats**: Plain text, JSON, CSV and an Atom feed
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use scanward::registry::SpecRegistry;
//! use scanward::storage::MemoryStore;
//! use scanward::types::ScanRequest;
//!
//! #[tokio::main]
//! async fn main() {
//!     let registry = SpecRegistry::new(MemoryStore::new());
//!     let spec = registry
//!         .create(ScanRequest::new("us-west-2", "123456789012", "app"))
//!         .await
//!         .unwrap();
//!
//!     println!("registered {}", spec.id);
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`types`] - Specs, identifiers and findings
//! - [`storage`] - The `BlobStore` trait and its backends
//! - [`registry`] - Spec persistence over a blob store
//! - [`scanner`] - The `ScanApi` trait, ECR client and scan driver
//! - [`orchestrator`] - Runs the driver over every registered spec
//! - [`api`] - Request/response handlers
//! - [`config`] - Settings and resolved service configuration
//! - [`error`] - Error types per layer
//! - [`output`] - Output formatting

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod orchestrator;
pub mod output;
pub mod registry;
pub mod scanner;
pub mod storage;
pub mod types;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use api::{Method, Request, Response, Service};
pub use error::{ServiceError, ServiceResult};
pub use orchestrator::{Orchestrator, Summary};
pub use registry::SpecRegistry;
pub use scanner::{ScanApi, ScanDriver, ScanMode, ScanOutcome};
pub use storage::BlobStore;
pub use types::{ScanRequest, ScanSpec, SpecId};
