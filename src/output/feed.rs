//! Atom feed of a spec's scan findings.
//!
//! One feed per spec, one entry per finding per tag, so feed readers can
//! follow a repository's vulnerabilities.

use crate::error::FeedError;
use crate::orchestrator::SpecScan;
use chrono::{DateTime, SecondsFormat, Utc};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Cursor;

const ATOM_NS: &str = "http://www.w3.org/2005/Atom";

/// Content type of the rendered feed.
pub const FEED_CONTENT_TYPE: &str = "application/atom+xml";

type XmlWriter = Writer<Cursor<Vec<u8>>>;

/// Console page of a repository.
pub fn console_link(region: &str, repository: &str) -> String {
    format!(
        "https://{}.console.aws.amazon.com/ecr/repositories/{}/",
        region, repository
    )
}

/// Render the findings of one spec as an Atom document.
///
/// `now` stamps the feed when no tag reports a scan completion time.
pub fn build_feed(scan: &SpecScan, now: DateTime<Utc>) -> Result<String, FeedError> {
    let spec = &scan.spec;
    let link = console_link(&spec.region, &spec.repository);

    let updated = scan
        .results
        .values()
        .filter_map(|r| r.findings().and_then(|f| f.completed_at))
        .max()
        .unwrap_or(now);

    let mut subtitle = String::from("Details of the image scan findings across the tags: ");
    for tag in scan.results.keys() {
        subtitle.push_str(&format!("[{}] ", tag));
    }

    let mut w = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
    write(&mut w, Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    write(
        &mut w,
        Event::Start(BytesStart::new("feed").with_attributes([("xmlns", ATOM_NS)])),
    )?;

    text_element(
        &mut w,
        "title",
        &format!("ECR repository {} in {}", spec.repository, spec.region),
    )?;
    text_element(&mut w, "id", &format!("urn:scanward:{}", spec.id))?;
    text_element(&mut w, "updated", &timestamp(updated))?;
    text_element(&mut w, "subtitle", subtitle.trim_end())?;
    link_element(&mut w, &link)?;

    write(&mut w, Event::Start(BytesStart::new("author")))?;
    text_element(&mut w, "name", "ECR")?;
    write(&mut w, Event::End(BytesEnd::new("author")))?;

    for (tag, result) in &scan.results {
        let Some(findings) = result.findings() else {
            continue;
        };
        let entry_updated = findings.completed_at.unwrap_or(updated);

        for finding in &findings.findings {
            write(&mut w, Event::Start(BytesStart::new("entry")))?;
            text_element(
                &mut w,
                "title",
                &format!(
                    "For image {}:{} found {}",
                    spec.repository, tag, finding.name
                ),
            )?;
            text_element(
                &mut w,
                "id",
                &format!("urn:scanward:{}:{}:{}", spec.id, tag, finding.name),
            )?;
            text_element(&mut w, "updated", &timestamp(entry_updated))?;
            if !finding.uri.is_empty() {
                link_element(&mut w, &finding.uri)?;
            }
            text_element(&mut w, "summary", &finding.description)?;
            text_element(&mut w, "category", finding.severity.as_str())?;
            write(&mut w, Event::End(BytesEnd::new("entry")))?;
        }
    }

    write(&mut w, Event::End(BytesEnd::new("feed")))?;

    Ok(String::from_utf8(w.into_inner().into_inner())?)
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn write(w: &mut XmlWriter, event: Event<'_>) -> Result<(), FeedError> {
    w.write_event(event)
        .map_err(|e| FeedError::Xml(e.to_string()))
}

fn text_element(w: &mut XmlWriter, name: &str, text: &str) -> Result<(), FeedError> {
    write(w, Event::Start(BytesStart::new(name)))?;
    write(w, Event::Text(BytesText::new(text)))?;
    write(w, Event::End(BytesEnd::new(name)))
}

fn link_element(w: &mut XmlWriter, href: &str) -> Result<(), FeedError> {
    write(
        w,
        Event::Empty(BytesStart::new("link").with_attributes([("href", href)])),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{sample_findings, spec_with_tags};
    use crate::types::{ScanAck, TagResult, TagResults};
    use chrono::TimeZone;

    fn scan(results: TagResults) -> SpecScan {
        SpecScan {
            spec: spec_with_tags(&["latest"]),
            results,
        }
    }

    #[test]
    fn test_feed_has_entry_per_finding() {
        let mut results = TagResults::new();
        results.insert("latest".into(), TagResult::Findings(sample_findings()));
        let now = Utc.timestamp_opt(1_800_000_000, 0).unwrap();

        let feed = build_feed(&scan(results), now).unwrap();

        assert!(feed.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(feed.contains("<feed xmlns=\"http://www.w3.org/2005/Atom\">"));
        assert!(feed.contains("<title>ECR repository app in us-west-2</title>"));
        assert!(feed.contains("<title>For image app:latest found CVE-2024-0001</title>"));
        assert!(feed.contains("<link href=\"https://security-tracker.example/CVE-2024-0001\"/>"));
        assert!(feed.contains("<updated>2023-11-14T22:13:20Z</updated>"));
        assert!(feed.contains("across the tags: [latest]</subtitle>"));
        assert_eq!(feed.matches("<entry>").count(), 1);
    }

    #[test]
    fn test_feed_escapes_text() {
        let mut findings = sample_findings();
        findings.findings[0].description = "a < b & c".to_string();
        let mut results = TagResults::new();
        results.insert("latest".into(), TagResult::Findings(findings));

        let feed = build_feed(&scan(results), Utc::now()).unwrap();
        assert!(feed.contains("a &lt; b &amp; c"));
    }

    #[test]
    fn test_feed_skips_acknowledgements() {
        let mut results = TagResults::new();
        results.insert(
            "latest".into(),
            TagResult::Triggered(ScanAck {
                status: "IN_PROGRESS".into(),
                description: None,
                image_digest: None,
            }),
        );
        let now = Utc.timestamp_opt(1_800_000_000, 0).unwrap();

        let feed = build_feed(&scan(results), now).unwrap();
        assert!(!feed.contains("<entry>"));
        assert!(feed.contains("<updated>2027-01-15T08:00:00Z</updated>"));
    }

    #[test]
    fn test_console_link() {
        assert_eq!(
            console_link("us-west-2", "app"),
            "https://us-west-2.console.aws.amazon.com/ecr/repositories/app/"
        );
    }
}
