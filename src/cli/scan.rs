//! Scan subcommands.
//!
//! Handles `scanward trigger`, `findings` and `summary`, which call the
//! registry scan API for registered specs.

use super::{parse_spec_id, AppOrchestrator, OutputFormat};
use crate::error::CliResult;
use crate::output;
use crate::scanner::ScanMode;
use chrono::Utc;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Spinner shown while scan API calls are in flight.
fn spinner(message: &str, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new_spinner();
    let template = "{spinner:.green} [{elapsed}] {msg}";
    if let Ok(style) = ProgressStyle::default_spinner().template(template) {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Start image scans for every registered spec.
#[derive(Parser, Debug)]
pub struct TriggerCommand {
    /// Output format
    #[arg(short, long, value_enum, default_value = "plain")]
    pub output: OutputFormat,
}

impl TriggerCommand {
    pub async fn execute(&self, orchestrator: &AppOrchestrator, quiet: bool) -> CliResult<()> {
        let pb = spinner("Starting scans", quiet);
        let result = orchestrator.run_all(ScanMode::Trigger).await;
        pb.finish_and_clear();

        let scans = result?;
        let started: usize = scans.iter().map(|s| s.results.len()).sum();

        if !quiet && self.output == OutputFormat::Plain {
            output::print_info(&format!(
                "Started {} scan(s) across {} spec(s)",
                started,
                scans.len()
            ));
        }

        output::format_scans(&scans, self.output)
    }
}

/// Describe the latest findings of one spec.
#[derive(Parser, Debug)]
pub struct FindingsCommand {
    /// Spec ID
    #[arg(value_name = "SPEC_ID")]
    pub id: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "plain")]
    pub output: OutputFormat,

    /// Print the Atom feed instead
    #[arg(long, conflicts_with = "output")]
    pub feed: bool,
}

impl FindingsCommand {
    pub async fn execute(&self, orchestrator: &AppOrchestrator, quiet: bool) -> CliResult<()> {
        let id = parse_spec_id(&self.id)?;

        let pb = spinner("Fetching findings", quiet);
        let result = orchestrator.findings(&id).await;
        pb.finish_and_clear();

        let scan = result?;

        if self.feed {
            println!("{}", output::build_feed(&scan, Utc::now())?);
            return Ok(());
        }

        output::format_scans(std::slice::from_ref(&scan), self.output)
    }
}

/// Summarize severity counts across all specs.
#[derive(Parser, Debug)]
pub struct SummaryCommand {
    /// Output format
    #[arg(short, long, value_enum, default_value = "plain")]
    pub output: OutputFormat,
}

impl SummaryCommand {
    pub async fn execute(&self, orchestrator: &AppOrchestrator, quiet: bool) -> CliResult<()> {
        let pb = spinner("Collecting findings", quiet);
        let result = orchestrator.summary().await;
        pb.finish_and_clear();

        output::format_summary(&result?, self.output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};

    #[test]
    fn test_findings_arguments() {
        let cli = Cli::parse_from(["scanward", "findings", "abc", "--feed"]);

        let Commands::Findings(cmd) = cli.command else {
            panic!("expected findings");
        };
        assert_eq!(cmd.id, "abc");
        assert!(cmd.feed);
    }

    #[test]
    fn test_summary_output_format() {
        let cli = Cli::parse_from(["scanward", "summary", "-o", "csv"]);

        let Commands::Summary(cmd) = cli.command else {
            panic!("expected summary");
        };
        assert_eq!(cmd.output, OutputFormat::Csv);
    }

    #[test]
    fn test_quiet_spinner_is_hidden() {
        assert!(spinner("working", true).is_hidden());
    }
}
