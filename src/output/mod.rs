//! Output formatting module.
//!
//! Provides formatters for plain text, JSON, and CSV output of specs and
//! scan results, and the Atom findings feed.

mod csv_format;
pub mod feed;
mod json_format;
mod plain;

pub use csv_format::{print_specs_csv, print_summary_csv, write_specs_csv, write_summary_csv};
pub use feed::{build_feed, FEED_CONTENT_TYPE};
pub use json_format::print_json;
pub use plain::{
    print_error, print_info, print_scans, print_spec, print_specs, print_success, print_summary,
};

use crate::cli::OutputFormat;
use crate::error::CliResult;
use crate::orchestrator::{SpecScan, Summary};
use crate::types::ScanSpec;

/// Print registered specs in the requested format.
pub fn format_specs(specs: &[ScanSpec], format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Plain => print_specs(specs)?,
        OutputFormat::Json => print_json(specs)?,
        OutputFormat::Csv => print_specs_csv(specs)?,
    }
    Ok(())
}

/// Print a findings summary in the requested format.
pub fn format_summary(summary: &Summary, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Plain => print_summary(summary)?,
        OutputFormat::Json => print_json(summary)?,
        OutputFormat::Csv => print_summary_csv(summary)?,
    }
    Ok(())
}

/// Print scan run results in the requested format.
///
/// CSV output flattens findings to the summary layout.
pub fn format_scans(scans: &[SpecScan], format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Plain => print_scans(scans)?,
        OutputFormat::Json => print_json(scans)?,
        OutputFormat::Csv => print_summary_csv(&Summary::from_scans(scans))?,
    }
    Ok(())
}
