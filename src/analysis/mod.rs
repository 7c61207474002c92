//! Roster analysis.
//!
//! Decoding, normalization and aggregation are pure and know nothing
//! about files; the driver feeds them records and takes reports back.

pub mod aggregator;
pub mod decoder;
pub mod normalizer;

pub use aggregator::*;
pub use decoder::*;
pub use normalizer::*;

use crate::models::{OrderKeyMode, PartyReport, RecordLocation, SourcedRecord};
use thiserror::Error;

/// Errors raised by the analysis pipeline.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AnalysisError {
    /// Identity code too short or without a two-digit year prefix.
    #[error("malformed identity code {code:?}: {reason}")]
    MalformedIdentityCode { code: String, reason: &'static str },

    /// Order number that cannot be parsed under numeric ordering.
    #[error("malformed order number {value:?}: expected an integer")]
    MalformedOrderNumber { value: String },

    /// Ratio with a zero denominator. Unreachable for accumulators built
    /// from at least one record.
    #[error("division by zero while computing {what}")]
    DivisionByZero { what: &'static str },

    /// A record error tagged with the roster row it came from.
    #[error("record at {location}")]
    InRecord {
        location: RecordLocation,
        #[source]
        source: Box<AnalysisError>,
    },
}

impl AnalysisError {
    /// Whether lenient mode may skip the offending record.
    pub fn is_record_error(&self) -> bool {
        match self {
            AnalysisError::MalformedIdentityCode { .. }
            | AnalysisError::MalformedOrderNumber { .. } => true,
            AnalysisError::InRecord { source, .. } => source.is_record_error(),
            AnalysisError::DivisionByZero { .. } => false,
        }
    }

    /// Attach the roster row an error was raised for.
    pub fn at(self, location: RecordLocation) -> Self {
        AnalysisError::InRecord {
            location,
            source: Box::new(self),
        }
    }
}

/// What to do with a record that fails to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Abort the run on the first bad record.
    #[default]
    Strict,
    /// Log a warning and skip the record.
    Lenient,
}

/// Settings shared by every stage of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisOptions {
    pub reference_year: i32,
    pub order_keys: OrderKeyMode,
    pub policy: ErrorPolicy,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            reference_year: DEFAULT_REFERENCE_YEAR,
            order_keys: OrderKeyMode::default(),
            policy: ErrorPolicy::default(),
        }
    }
}

/// Run the whole pipeline over an in-memory record list.
#[allow(dead_code)] // Single-shot entry point; the CLI folds per file instead
pub fn run_pipeline(
    records: impl IntoIterator<Item = SourcedRecord>,
    options: &AnalysisOptions,
) -> Result<Vec<PartyReport>, AnalysisError> {
    let aggregator = aggregate(records, options)?;
    crate::report::build(aggregator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Record;

    fn records(rows: &[(&str, &str, &str)]) -> Vec<SourcedRecord> {
        rows.iter()
            .map(|(id, party, order)| Record::new(*id, *party, *order).into())
            .collect()
    }

    #[test]
    fn test_end_to_end_example() {
        let input = records(&[
            ("8501234567890", "ABC PARTY", "1"),
            ("0006789012345", "ABC PARTY", "2"),
        ]);

        let reports = run_pipeline(input, &AnalysisOptions::default()).unwrap();

        assert_eq!(reports.len(), 1);
        let report = &reports[0];
        assert_eq!(report.party, "Abc Party");
        assert_eq!(report.total, 2);
        assert_eq!(report.median_age, 26.5);
        // 7th characters are '4' and '9'
        assert_eq!(report.female, 1);
        assert_eq!(report.male, 1);
        assert_eq!(report.female_ratio, 0.5);
        assert_eq!(report.top10_female_ratio, 0.5);
    }

    #[test]
    fn test_pipeline_sorts_by_total() {
        let input = records(&[
            ("8501234567890", "SMALL PARTY", "1"),
            ("8501294567890", "BIG PARTY", "1"),
            ("8501294567890", "BIG PARTY", "2"),
        ]);

        let reports = run_pipeline(input, &AnalysisOptions::default()).unwrap();

        assert_eq!(reports[0].party, "Big Party");
        assert_eq!(reports[1].party, "Small Party");
    }

    #[test]
    fn test_strict_pipeline_fails_on_bad_code() {
        let input = records(&[("85", "ABC PARTY", "1")]);

        let err = run_pipeline(input, &AnalysisOptions::default()).unwrap_err();
        assert!(err.is_record_error());
    }

    #[test]
    fn test_sample_roster() {
        let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("fixtures")
            .join("sample_roster.csv");
        let records =
            crate::roster::read_roster(&path, &crate::config::ColumnConfig::default(), false)
                .unwrap();

        let reports = run_pipeline(records, &AnalysisOptions::default()).unwrap();
        let names: Vec<&str> = reports.iter().map(|r| r.party.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "People's Freedom Party",
                "Civic Movement",
                "South African Maintanance And Estate Beneficiaries Association",
            ]
        );

        let pfp = &reports[0];
        assert_eq!((pfp.male, pfp.female, pfp.total), (5, 7, 12));
        assert_eq!(pfp.median_age, 37.5);
        assert_eq!(pfp.female_ratio, 0.58);
        assert_eq!((pfp.top10_male, pfp.top10_female), (5, 5));
        assert_eq!(pfp.top10_female_ratio, 0.5);
        assert_eq!(pfp.top10_median_age, 40.5);

        let civic = &reports[1];
        assert_eq!(civic.median_age, 44.0);
        assert_eq!(civic.female_ratio, 0.33);

        let association = &reports[2];
        assert_eq!(association.median_age, 64.0);
        assert_eq!(association.top10_female_ratio, 0.67);
    }

    #[test]
    fn test_error_messages() {
        let err = AnalysisError::DivisionByZero {
            what: "femaleRatio",
        };
        assert_eq!(err.to_string(), "division by zero while computing femaleRatio");
        assert!(!err.is_record_error());
    }
}
