//! CSV output formatting.

use crate::orchestrator::Summary;
use crate::types::{ScanSpec, Severity};
use std::io;

const SEVERITIES: [Severity; 6] = [
    Severity::Critical,
    Severity::High,
    Severity::Medium,
    Severity::Low,
    Severity::Informational,
    Severity::Undefined,
];

/// Write registered specs as CSV.
pub fn write_specs_csv<W: io::Write>(specs: &[ScanSpec], writer: W) -> csv::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);

    wtr.write_record(["id", "created", "region", "registry", "repository", "tags", "level"])?;

    for spec in specs {
        wtr.write_record([
            &spec.id.to_string(),
            &spec.created,
            &spec.region,
            &spec.registry_id,
            &spec.repository,
            &spec.tags.join(";"),
            &spec.level().to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Write the findings summary as CSV, one row per scanned tag.
pub fn write_summary_csv<W: io::Write>(summary: &Summary, writer: W) -> csv::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);

    let mut header = vec!["id", "repository", "region", "tag"];
    header.extend(SEVERITIES.iter().map(|s| s.as_str()));
    wtr.write_record(&header)?;

    for entry in &summary.entries {
        let mut row = vec![
            entry.id.to_string(),
            entry.repository.clone(),
            entry.region.clone(),
            entry.tag.clone(),
        ];
        row.extend(
            SEVERITIES
                .iter()
                .map(|s| entry.counts.get(s).copied().unwrap_or(0).to_string()),
        );
        wtr.write_record(&row)?;
    }

    wtr.flush()?;
    Ok(())
}

/// Print the findings summary as CSV.
pub fn print_summary_csv(summary: &Summary) -> csv::Result<()> {
    write_summary_csv(summary, io::stdout().lock())
}

/// Print registered specs as CSV.
pub fn print_specs_csv(specs: &[ScanSpec]) -> csv::Result<()> {
    write_specs_csv(specs, io::stdout().lock())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::SummaryEntry;
    use crate::types::{Level, SpecId};

    #[test]
    fn test_summary_csv_columns() {
        let summary = Summary {
            entries: vec![SummaryEntry {
                id: SpecId::new(),
                repository: "app".into(),
                region: "us-west-2".into(),
                tag: "latest".into(),
                level: Level::All,
                counts: [(Severity::High, 3)].into_iter().collect(),
            }],
        };

        let mut buf = Vec::new();
        write_summary_csv(&summary, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();

        assert_eq!(
            lines.next().unwrap(),
            "id,repository,region,tag,CRITICAL,HIGH,MEDIUM,LOW,INFORMATIONAL,UNDEFINED"
        );
        assert!(lines.next().unwrap().ends_with(",app,us-west-2,latest,0,3,0,0,0,0"));
    }
}
