//! CLI subcommand definitions and handlers.
//!
//! Implements a git-like subcommand architecture:
//! - `scanward register|list|show|delete` - Manage scan specs
//! - `scanward trigger|findings|summary` - Run scans against the registry
//! - `scanward invoke` - Feed one request envelope through the API handlers

mod invoke;
mod scan;
mod specs;

pub use invoke::{Endpoint, InvokeCommand};
pub use scan::{FindingsCommand, SummaryCommand, TriggerCommand};
pub use specs::{DeleteCommand, ListCommand, RegisterCommand, ShowCommand};

use crate::config::{AppSettings, ServiceConfig, StorageBackend, BUCKET_ENV};
use crate::error::{CliResult, ServiceError};
use crate::orchestrator::Orchestrator;
use crate::registry::SpecRegistry;
use crate::scanner::{BoxedScanApi, EcrScanApi, ScanDriver};
use crate::storage::{BoxedBlobStore, FsStore, MemoryStore, S3Store};
use crate::types::SpecId;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;

/// Orchestrator wired to the configured backends.
pub type AppOrchestrator = Orchestrator<BoxedBlobStore, BoxedScanApi>;

/// Scanward - registry of container image scan specs.
///
/// Register which ECR repositories and tags to scan, start scans on a
/// schedule, and read back findings as tables, JSON, CSV or an Atom feed.
#[derive(Parser, Debug)]
#[command(name = "scanward")]
#[command(author = "HueCodes <huecodes@proton.me>")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Scan spec registry for container image repositories", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to custom settings file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Bucket holding scan specs
    #[arg(long, global = true, env = BUCKET_ENV, value_name = "BUCKET")]
    pub bucket: Option<String>,

    /// Storage backend for scan specs
    #[arg(long, global = true, value_enum)]
    pub backend: Option<StorageBackend>,

    /// Directory for the local backend
    #[arg(long, global = true, value_name = "DIR")]
    pub store_dir: Option<PathBuf>,

    /// Override the ECR endpoint URL
    #[arg(long, global = true, value_name = "URL")]
    pub ecr_endpoint: Option<String>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Register a new scan spec
    #[command(alias = "r")]
    Register(RegisterCommand),

    /// List registered scan specs
    #[command(alias = "ls")]
    List(ListCommand),

    /// Show one scan spec
    Show(ShowCommand),

    /// Delete a scan spec
    #[command(alias = "rm")]
    Delete(DeleteCommand),

    /// Start image scans for every registered spec
    #[command(alias = "t")]
    Trigger(TriggerCommand),

    /// Describe the latest findings of one spec
    #[command(alias = "f")]
    Findings(FindingsCommand),

    /// Summarize severity counts across all specs
    Summary(SummaryCommand),

    /// Handle one request envelope and print the response
    Invoke(InvokeCommand),
}

/// Output format for results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable plain text
    #[default]
    Plain,
    /// JSON structured output
    Json,
    /// CSV format for data analysis
    Csv,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Plain => write!(f, "plain"),
            Self::Json => write!(f, "json"),
            Self::Csv => write!(f, "csv"),
        }
    }
}

impl Cli {
    /// Load persisted settings, from `--config` if given.
    pub fn settings(&self) -> CliResult<AppSettings> {
        let settings = match &self.config {
            Some(path) => AppSettings::load_from(path)?,
            None => AppSettings::load()?,
        };
        Ok(settings)
    }

    /// Merge settings with flags and environment.
    pub fn service_config(&self, settings: &AppSettings) -> ServiceConfig {
        ServiceConfig::from_settings(settings)
            .with_backend(self.backend)
            .with_bucket(self.bucket.clone())
            .with_store_dir(self.store_dir.clone())
            .with_ecr_endpoint(self.ecr_endpoint.clone())
    }

    /// Execute the chosen subcommand.
    pub async fn run(&self, config: &ServiceConfig) -> CliResult<()> {
        let orchestrator = connect(config).await?;

        match &self.command {
            Commands::Register(cmd) => cmd.execute(&orchestrator, self.quiet).await,
            Commands::List(cmd) => cmd.execute(&orchestrator).await,
            Commands::Show(cmd) => cmd.execute(&orchestrator).await,
            Commands::Delete(cmd) => cmd.execute(&orchestrator, self.quiet).await,
            Commands::Trigger(cmd) => cmd.execute(&orchestrator, self.quiet).await,
            Commands::Findings(cmd) => cmd.execute(&orchestrator, self.quiet).await,
            Commands::Summary(cmd) => cmd.execute(&orchestrator, self.quiet).await,
            Commands::Invoke(cmd) => cmd.execute(orchestrator).await,
        }
    }
}

/// Build the storage backend and scan API for `config`.
pub async fn connect(config: &ServiceConfig) -> CliResult<AppOrchestrator> {
    config.validate()?;

    let sdk_config = aws_config::load_from_env().await;

    let store: BoxedBlobStore = match config.backend {
        StorageBackend::S3 => {
            // validate() guarantees a bucket for S3
            let bucket = config.bucket.clone().unwrap_or_default();
            debug!(bucket = %bucket, "using S3 spec store");
            Box::new(S3Store::new(&sdk_config, bucket))
        }
        StorageBackend::Local => {
            let store = match &config.store_dir {
                Some(dir) => FsStore::open(dir),
                None => FsStore::open_default(),
            }
            .map_err(ServiceError::from)?;
            debug!(root = %store.root().display(), "using local spec store");
            Box::new(store)
        }
        StorageBackend::Memory => {
            debug!("using in-memory spec store");
            Box::new(MemoryStore::new())
        }
    };

    let mut api = EcrScanApi::new(sdk_config);
    if let Some(endpoint) = &config.ecr_endpoint {
        api = api.with_endpoint(endpoint.clone());
    }
    let api: BoxedScanApi = Box::new(api);

    Ok(Orchestrator::new(
        SpecRegistry::new(store),
        ScanDriver::new(api),
    ))
}

/// Parse a spec ID argument.
pub(crate) fn parse_spec_id(raw: &str) -> CliResult<SpecId> {
    raw.parse()
        .map_err(|_| crate::error::CliError::Other(format!("invalid spec ID '{}'", raw)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_flags_override_settings() {
        let cli = Cli::parse_from([
            "scanward",
            "--backend",
            "local",
            "--store-dir",
            "/tmp/specs",
            "list",
        ]);
        let settings = AppSettings::default();

        let config = cli.service_config(&settings);
        assert_eq!(config.backend, StorageBackend::Local);
        assert_eq!(config.store_dir, Some(PathBuf::from("/tmp/specs")));
    }

    #[test]
    fn test_parse_spec_id() {
        let id = SpecId::new();
        assert_eq!(parse_spec_id(&id.to_string()).unwrap(), id);
        assert!(parse_spec_id("abc").is_err());
    }
}
