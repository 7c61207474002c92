//! Report rendering.
//!
//! This module renders the ordered party statistics as JSON (the
//! primary output) or as a Markdown summary for human readers.

use crate::models::{PartyReport, RunSummary};
use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::io::Write;
use std::path::Path;

/// Generate the JSON report: an array of party objects, 4-space indented.
pub fn generate_json_report(reports: &[PartyReport]) -> Result<String> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = Serializer::with_formatter(&mut buf, formatter);
    reports.serialize(&mut serializer)?;
    buf.push(b'\n');

    String::from_utf8(buf).context("JSON output was not valid UTF-8")
}

/// Generate a complete Markdown report.
pub fn generate_markdown_report(summary: &RunSummary, reports: &[PartyReport]) -> String {
    let mut output = String::new();

    output.push_str("# Party Roster Report\n\n");
    output.push_str(&generate_metadata_section(summary));
    output.push_str(&generate_overview_section(reports));
    output.push_str(&generate_parties_section(reports));
    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(summary: &RunSummary) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Source:** `{}`\n", summary.source));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        summary.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Files Read:** {}\n", summary.files_read));
    section.push_str(&format!("- **Records Read:** {}\n", summary.records_read));
    if summary.records_skipped > 0 {
        section.push_str(&format!(
            "- **Records Skipped:** {}\n",
            summary.records_skipped
        ));
    }
    section.push_str(&format!("- **Parties:** {}\n", summary.parties));
    section.push_str(&format!(
        "- **Order Keys:** {}\n",
        summary.order_key_mode
    ));
    section.push_str(&format!(
        "- **Reference Year:** {}\n",
        summary.reference_year
    ));
    section.push('\n');

    section
}

/// Generate the overall totals across every party.
fn generate_overview_section(reports: &[PartyReport]) -> String {
    let mut section = String::new();

    let male: usize = reports.iter().map(|r| r.male).sum();
    let female: usize = reports.iter().map(|r| r.female).sum();
    let total = male + female;

    section.push_str("## Overview\n\n");
    section.push_str("| Candidates | Men | Women | Women % |\n");
    section.push_str("|:---:|:---:|:---:|:---:|\n");

    let share = if total == 0 {
        "-".to_string()
    } else {
        format!("{:.0}%", female as f64 * 100.0 / total as f64)
    };
    section.push_str(&format!(
        "| {} | {} | {} | {} |\n\n",
        total, male, female, share
    ));

    section
}

/// Generate the per-party table.
fn generate_parties_section(reports: &[PartyReport]) -> String {
    let mut section = String::new();

    section.push_str("## Parties\n\n");

    if reports.is_empty() {
        section.push_str("No candidates were found in the roster.\n\n");
        return section;
    }

    section.push_str(
        "| Party | Total | Men | Women | Median Age | Women Ratio | Top 10 Men | Top 10 Women | Top 10 Women Ratio | Top 10 Median Age |\n",
    );
    section.push_str("|:---|---:|---:|---:|---:|---:|---:|---:|---:|---:|\n");

    for report in reports {
        section.push_str(&generate_party_row(report));
    }
    section.push('\n');

    section
}

/// Generate a single table row.
fn generate_party_row(report: &PartyReport) -> String {
    format!(
        "| {} | {} | {} | {} | {} | {:.2} | {} | {} | {:.2} | {} |\n",
        report.party.replace('|', "\\|"),
        report.total,
        report.male,
        report.female,
        report.median_age,
        report.female_ratio,
        report.top10_male,
        report.top10_female,
        report.top10_female_ratio,
        report.top10_median_age
    )
}

/// Generate the report footer.
fn generate_footer() -> String {
    "---\n\n*Report generated by partyroll*\n".to_string()
}

/// Write rendered output to a file, or to stdout when `path` is `None`.
pub fn write_report(content: &str, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => {
            let mut file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            file.write_all(content.as_bytes())
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
        }
        None => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(content.as_bytes())
                .context("Failed to write report to stdout")?;
        }
    }

    Ok(())
}
