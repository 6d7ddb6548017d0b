//! Invoke subcommand implementation.
//!
//! Handles `scanward invoke`, which runs a single request envelope through the
//! API handlers and prints the response envelope as JSON. Host adapters can
//! shell out to it, and it is handy for checking status mapping by hand.

use super::AppOrchestrator;
use crate::api::{Method, Request, Service};
use crate::error::{CliError, CliResult};
use crate::output;
use clap::Parser;
use std::io::Read;

/// Which handler receives the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Endpoint {
    /// Spec management and findings feeds
    #[default]
    Configs,
    /// Severity summary
    Summary,
    /// Scheduled scan trigger; ignores the request
    Trigger,
}

/// Handle one request envelope and print the response.
#[derive(Parser, Debug)]
pub struct InvokeCommand {
    /// Handler to invoke
    #[arg(short, long, value_enum, default_value = "configs")]
    pub endpoint: Endpoint,

    /// Request method
    #[arg(short = 'X', long, default_value = "GET")]
    pub method: String,

    /// Spec ID path parameter
    #[arg(long)]
    pub id: Option<String>,

    /// Request body
    #[arg(short, long, conflicts_with = "stdin")]
    pub body: Option<String>,

    /// Read the whole request envelope as JSON from stdin
    #[arg(long)]
    pub stdin: bool,
}

impl InvokeCommand {
    fn request_from_flags(&self) -> Request {
        Request {
            method: Method::from(self.method.as_str()),
            id: self.id.clone(),
            body: self.body.clone().unwrap_or_default(),
        }
    }

    fn request(&self) -> CliResult<Request> {
        if !self.stdin {
            return Ok(self.request_from_flags());
        }

        let mut raw = String::new();
        std::io::stdin().read_to_string(&mut raw)?;
        serde_json::from_str(&raw)
            .map_err(|e| CliError::Other(format!("invalid request envelope: {}", e)))
    }

    pub async fn execute(&self, orchestrator: AppOrchestrator) -> CliResult<()> {
        let service = Service::new(orchestrator);

        let response = match self.endpoint {
            Endpoint::Configs => service.handle_configs(&self.request()?).await,
            Endpoint::Summary => service.handle_summary(&self.request()?).await,
            Endpoint::Trigger => {
                let started = service.scheduled_trigger().await?;
                output::print_json(&serde_json::json!({ "started": started }))?;
                return Ok(());
            }
        };

        output::print_json(&response)?;
        Ok(())
    }
}
