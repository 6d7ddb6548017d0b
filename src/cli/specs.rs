//! Spec management subcommands.
//!
//! Handles `scanward register`, `list`, `show` and `delete`.

use super::{parse_spec_id, AppOrchestrator, OutputFormat};
use crate::error::{CliError, CliResult};
use crate::output;
use crate::types::{Level, ScanRequest};
use clap::Parser;

/// Register a new scan spec.
#[derive(Parser, Debug)]
pub struct RegisterCommand {
    /// AWS region of the registry
    #[arg(long)]
    pub region: String,

    /// Registry (AWS account) ID
    #[arg(long)]
    pub registry: String,

    /// Repository name
    #[arg(long)]
    pub repository: String,

    /// Tag to scan; repeat for several. Scans every tag if omitted
    #[arg(short, long = "tag", value_name = "TAG")]
    pub tags: Vec<String>,

    /// Minimum severity reported in summaries
    #[arg(short, long, value_enum)]
    pub level: Option<Level>,

    /// Print the new spec as JSON
    #[arg(long)]
    pub json: bool,
}

impl RegisterCommand {
    fn request(&self) -> ScanRequest {
        let request = ScanRequest::new(&self.region, &self.registry, &self.repository)
            .with_tags(self.tags.iter().cloned());

        match self.level {
            Some(level) => request.with_level(level),
            None => request,
        }
    }

    pub async fn execute(&self, orchestrator: &AppOrchestrator, quiet: bool) -> CliResult<()> {
        let spec = orchestrator.registry().create(self.request()).await?;

        if self.json {
            output::print_json(&spec)?;
        } else if quiet {
            println!("{}", spec.id);
        } else {
            output::print_success(&format!(
                "Registered {} as {}",
                spec.target(),
                spec.id
            ));
        }

        Ok(())
    }
}

/// List registered scan specs.
#[derive(Parser, Debug)]
pub struct ListCommand {
    /// Output format
    #[arg(short, long, value_enum, default_value = "plain")]
    pub output: OutputFormat,
}

impl ListCommand {
    pub async fn execute(&self, orchestrator: &AppOrchestrator) -> CliResult<()> {
        let specs = orchestrator.registry().list().await?;
        output::format_specs(&specs, self.output)
    }
}

/// Show one scan spec.
#[derive(Parser, Debug)]
pub struct ShowCommand {
    /// Spec ID
    #[arg(value_name = "SPEC_ID")]
    pub id: String,

    /// Print as JSON
    #[arg(long)]
    pub json: bool,
}

impl ShowCommand {
    pub async fn execute(&self, orchestrator: &AppOrchestrator) -> CliResult<()> {
        let id = parse_spec_id(&self.id)?;
        let spec = orchestrator.registry().get(&id).await?;

        if self.json {
            output::print_json(&spec)?;
        } else {
            output::print_spec(&spec)?;
        }
        Ok(())
    }
}

/// Delete a scan spec.
#[derive(Parser, Debug)]
pub struct DeleteCommand {
    /// Spec ID
    #[arg(value_name = "SPEC_ID")]
    pub id: String,

    /// Skip confirmation
    #[arg(short = 'y', long)]
    pub yes: bool,
}

impl DeleteCommand {
    pub async fn execute(&self, orchestrator: &AppOrchestrator, quiet: bool) -> CliResult<()> {
        let id = parse_spec_id(&self.id)?;
        let registry = orchestrator.registry();

        if !registry.exists(&id).await? {
            return Err(CliError::Other(format!("scan spec '{}' not found", id)));
        }

        if !self.yes {
            println!("Delete scan spec '{}'? [y/N] ", id);
            let mut input = String::new();
            std::io::stdin().read_line(&mut input)?;
            if !input.trim().eq_ignore_ascii_case("y") {
                println!("Cancelled.");
                return Ok(());
            }
        }

        registry.delete(&id).await?;

        if !quiet {
            output::print_success(&format!("Scan spec {} deleted", id));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};

    #[test]
    fn test_register_arguments() {
        let cli = Cli::parse_from([
            "scanward",
            "register",
            "--region",
            "us-west-2",
            "--registry",
            "123",
            "--repository",
            "app",
            "-t",
            "v1",
            "-t",
            "v2",
            "--level",
            "high",
        ]);

        let Commands::Register(cmd) = cli.command else {
            panic!("expected register");
        };

        let request = cmd.request();
        assert_eq!(request.region, "us-west-2");
        assert_eq!(request.registry_id, "123");
        assert_eq!(request.tags, vec!["v1", "v2"]);
        assert_eq!(request.level, Some(Level::High));
    }

    #[test]
    fn test_register_defaults_to_all_tags() {
        let cli = Cli::parse_from([
            "scanward",
            "register",
            "--region",
            "eu-west-1",
            "--registry",
            "456",
            "--repository",
            "api",
        ]);

        let Commands::Register(cmd) = cli.command else {
            panic!("expected register");
        };

        let request = cmd.request();
        assert!(request.tags.is_empty());
        assert_eq!(request.level, None);
    }
}
