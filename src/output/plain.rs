//! Plain text output formatting.
//!
//! Produces human-readable output with colors and formatting.

use crate::orchestrator::{format_counts, SpecScan, Summary};
use crate::types::{ScanSpec, Severity, TagResult};
use console::{style, Style};
use std::io::{self, Write};

const RULE: &str = "───────────────────────────────────────────────────────────────";

/// Print registered specs as a table.
pub fn print_specs(specs: &[ScanSpec]) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if specs.is_empty() {
        writeln!(out, "  {}", style("No scan specs registered.").dim())?;
        return Ok(());
    }

    writeln!(out)?;
    writeln!(
        out,
        "  {:<10}  {:<14}  {:<14}  {:<24}  {}",
        style("ID").bold(),
        style("REGION").bold(),
        style("REGISTRY").bold(),
        style("REPOSITORY").bold(),
        style("TAGS").bold()
    )?;
    writeln!(out, "  {}", style(RULE).dim())?;

    for spec in specs {
        writeln!(
            out,
            "  {:<10}  {:<14}  {:<14}  {:<24}  {}",
            style(spec.id.short()).dim(),
            spec.region,
            spec.registry_id,
            truncate_string(&spec.repository, 24),
            tags_display(spec)
        )?;
    }

    writeln!(out)?;
    Ok(())
}

/// Print one spec in detail.
pub fn print_spec(spec: &ScanSpec) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    writeln!(out)?;
    writeln!(out, "  {} {}", style("ID:").bold(), spec.id)?;
    writeln!(out, "  {} {}", style("Created:").bold(), spec.created)?;
    writeln!(out, "  {} {}", style("Region:").bold(), spec.region)?;
    writeln!(out, "  {} {}", style("Registry:").bold(), spec.registry_id)?;
    writeln!(out, "  {} {}", style("Repository:").bold(), spec.repository)?;
    writeln!(out, "  {} {}", style("Tags:").bold(), tags_display(spec))?;
    writeln!(out, "  {} {}", style("Level:").bold(), spec.level())?;
    writeln!(out)?;

    Ok(())
}

/// Print per-tag results of scan runs.
pub fn print_scans(scans: &[SpecScan]) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for scan in scans {
        writeln!(
            out,
            "\n  {} {} ({})",
            style("Repository:").bold(),
            style(&scan.spec.repository).white().bold(),
            scan.spec.region
        )?;

        if scan.results.is_empty() {
            writeln!(out, "    {}", style("No tagged images.").dim())?;
            continue;
        }

        for (tag, result) in &scan.results {
            match result {
                TagResult::Triggered(ack) => writeln!(
                    out,
                    "    {:<24} {}",
                    tag,
                    style(&ack.status).cyan()
                )?,
                TagResult::Findings(findings) => writeln!(
                    out,
                    "    {:<24} {}",
                    tag,
                    severity_style(findings.severity_counts.keys().max().copied())
                        .apply_to(format_counts(&findings.severity_counts))
                )?,
            }
        }
    }

    writeln!(out)?;
    Ok(())
}

/// Print the findings summary.
pub fn print_summary(summary: &Summary) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if summary.is_empty() {
        writeln!(out, "  {}", style("No findings to report.").dim())?;
        return Ok(());
    }

    for entry in &summary.entries {
        writeln!(
            out,
            "Results for {}:{} in {}:",
            style(&entry.repository).bold(),
            entry.tag,
            entry.region
        )?;
        writeln!(
            out,
            "{}",
            severity_style(entry.counts.keys().max().copied()).apply_to(format_counts(&entry.counts))
        )?;
        writeln!(out)?;
    }

    Ok(())
}

/// Print an error message.
pub fn print_error(msg: &str) {
    eprintln!("{} {}", style("Error:").red().bold(), msg);
}

/// Print a success message.
pub fn print_success(msg: &str) {
    println!("{} {}", style("✓").green().bold(), msg);
}

/// Print an info message.
pub fn print_info(msg: &str) {
    println!("{} {}", style("ℹ").blue().bold(), msg);
}

fn severity_style(worst: Option<Severity>) -> Style {
    match worst {
        Some(Severity::Critical) | Some(Severity::High) => Style::new().red().bold(),
        Some(Severity::Medium) => Style::new().yellow(),
        Some(_) => Style::new().green(),
        None => Style::new().dim(),
    }
}

fn tags_display(spec: &ScanSpec) -> String {
    if spec.scans_all_tags() {
        "(all tagged)".to_string()
    } else {
        spec.tags.join(", ")
    }
}

/// Truncate a string to a maximum length, adding ellipsis if truncated.
fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
