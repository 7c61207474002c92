//! CSV roster reading.
//!
//! Rosters are headered CSV files. Only three columns are used; their
//! names come from the `[columns]` config section.

use crate::config::ColumnConfig;
use crate::models::{Record, RecordLocation, SourcedRecord};
use anyhow::{anyhow, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

const PROGRESS_EVERY: usize = 1000;

/// Positions of the required columns in a header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ColumnIndex {
    identity: usize,
    party: usize,
    order: usize,
}

impl ColumnIndex {
    fn resolve(
        headers: &csv::StringRecord,
        columns: &ColumnConfig,
        source: &Path,
    ) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim_start_matches('\u{feff}').trim() == name)
                .ok_or_else(|| {
                    anyhow!(
                        "Column {:?} not found in {} (available: {})",
                        name,
                        source.display(),
                        headers.iter().collect::<Vec<_>>().join(", ")
                    )
                })
        };

        Ok(Self {
            identity: find(columns.identity.as_str())?,
            party: find(columns.party.as_str())?,
            order: find(columns.order.as_str())?,
        })
    }
}

/// Read every record from a roster file.
pub fn read_roster(
    path: &Path,
    columns: &ColumnConfig,
    show_progress: bool,
) -> Result<Vec<SourcedRecord>> {
    info!("Reading roster: {}", path.display());

    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open roster file: {}", path.display()))?;

    let pb = if show_progress {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb
    } else {
        ProgressBar::hidden()
    };

    let records = read_records(file, path, columns, |n| {
        pb.set_message(format!("{}: {} records", path.display(), n));
        pb.tick();
    });

    match &records {
        Ok(records) => {
            pb.finish_and_clear();
            debug!("Read {} records from {}", records.len(), path.display());
        }
        Err(_) => pb.abandon(),
    }

    records
}

/// Read records from any CSV source.
///
/// `source` is only used to label locations and errors. `on_progress` is
/// called with the running count every [`PROGRESS_EVERY`] records.
pub fn read_records<R: Read>(
    input: R,
    source: &Path,
    columns: &ColumnConfig,
    mut on_progress: impl FnMut(usize),
) -> Result<Vec<SourcedRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(input);

    let headers = reader
        .headers()
        .with_context(|| format!("Failed to read header row of {}", source.display()))?
        .clone();
    let index = ColumnIndex::resolve(&headers, columns, source)?;

    let mut records = Vec::new();
    for (i, row) in reader.records().enumerate() {
        let row_number = i + 1;
        let row = row
            .with_context(|| format!("Malformed CSV at {}:{}", source.display(), row_number))?;

        let field = |idx: usize, name: &str| {
            row.get(idx).map(str::to_string).ok_or_else(|| {
                anyhow!(
                    "Row {} of {} has no {:?} field",
                    row_number,
                    source.display(),
                    name
                )
            })
        };

        let record = Record {
            identity_code: field(index.identity, columns.identity.as_str())?
                .trim()
                .to_string(),
            party_label: field(index.party, columns.party.as_str())?,
            order_number: field(index.order, columns.order.as_str())?,
        };

        records.push(SourcedRecord {
            record,
            location: Some(RecordLocation {
                file: source.to_path_buf(),
                row: row_number,
            }),
        });

        if records.len() % PROGRESS_EVERY == 0 {
            on_progress(records.len());
        }
    }

    Ok(records)
}

/// Count data rows without interpreting them.
pub fn count_rows(path: &Path) -> Result<usize> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to open roster file: {}", path.display()))?;

    let mut count = 0;
    for row in reader.records() {
        row.with_context(|| format!("Malformed CSV in {}", path.display()))?;
        count += 1;
    }

    Ok(count)
}
