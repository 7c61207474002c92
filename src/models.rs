//! Data models for the roster analyzer.
//!
//! This module contains the core data structures used throughout
//! the application for representing roster records, decoded
//! demographics, and per-party reports.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::path::PathBuf;

/// Sex of a candidate, as encoded in the identity code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sex::Male => write!(f, "male"),
            Sex::Female => write!(f, "female"),
        }
    }
}

/// Demographic attributes derived from an identity code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedAttributes {
    pub sex: Sex,
    /// Age at the reference year. Not validated for plausibility.
    pub age: i32,
}

/// A single roster row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// National identity code (digit string, at least 7 characters).
    pub identity_code: String,
    /// Party label exactly as it appears in the source.
    pub party_label: String,
    /// List position, kept raw until the run's [`OrderKeyMode`] is applied.
    pub order_number: String,
}

impl Record {
    #[allow(dead_code)] // Convenience constructor for in-memory rosters
    pub fn new(
        identity_code: impl Into<String>,
        party_label: impl Into<String>,
        order_number: impl Into<String>,
    ) -> Self {
        Self {
            identity_code: identity_code.into(),
            party_label: party_label.into(),
            order_number: order_number.into(),
        }
    }
}

/// Where a record came from, for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordLocation {
    pub file: PathBuf,
    /// 1-based data row (the header is not counted).
    pub row: usize,
}

impl fmt::Display for RecordLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file.display(), self.row)
    }
}

/// A record together with its source location.
#[derive(Debug, Clone)]
pub struct SourcedRecord {
    pub record: Record,
    pub location: Option<RecordLocation>,
}

impl From<Record> for SourcedRecord {
    fn from(record: Record) -> Self {
        Self {
            record,
            location: None,
        }
    }
}

/// How order numbers are compared when ranking a party's list.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OrderKeyMode {
    /// Parse as a signed integer ("2" sorts before "10").
    #[default]
    Numeric,
    /// Compare the raw strings byte-wise ("10" sorts before "2").
    Lexical,
}

impl fmt::Display for OrderKeyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderKeyMode::Numeric => write!(f, "numeric"),
            OrderKeyMode::Lexical => write!(f, "lexical"),
        }
    }
}

/// A comparable list position.
///
/// A single run only ever produces one variant, so the cross-variant
/// ordering never decides a comparison in practice.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OrderKey {
    Numeric(i64),
    Lexical(String),
}

impl Ord for OrderKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (OrderKey::Numeric(a), OrderKey::Numeric(b)) => a.cmp(b),
            (OrderKey::Lexical(a), OrderKey::Lexical(b)) => a.cmp(b),
            (OrderKey::Numeric(_), OrderKey::Lexical(_)) => Ordering::Less,
            (OrderKey::Lexical(_), OrderKey::Numeric(_)) => Ordering::Greater,
        }
    }
}

impl PartialOrd for OrderKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Final statistics for one party.
///
/// Field order here is the key order of the serialized JSON object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartyReport {
    /// Display-normalized party name.
    pub party: String,
    pub male: usize,
    pub female: usize,
    pub total: usize,
    pub median_age: f64,
    /// Share of women, rounded to 2 decimals.
    pub female_ratio: f64,
    #[serde(rename = "top10Male")]
    pub top10_male: usize,
    #[serde(rename = "top10Female")]
    pub top10_female: usize,
    #[serde(rename = "top10FemaleRatio")]
    pub top10_female_ratio: f64,
    /// Median age of the top-10 list positions.
    #[serde(rename = "top10MedianAge")]
    pub top10_median_age: f64,
}

impl PartyReport {
    /// Number of entries counted in the top-10 breakdown.
    #[allow(dead_code)] // Utility for consumers checking the top-10 bound
    pub fn top10_total(&self) -> usize {
        self.top10_male + self.top10_female
    }
}

/// Metadata about a run, shown in the Markdown report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// Input path as given on the command line.
    pub source: String,
    /// Date and time the report was generated.
    pub generated_at: DateTime<Utc>,
    /// Number of roster files read.
    pub files_read: usize,
    /// Number of data rows read.
    pub records_read: usize,
    /// Number of rows skipped in lenient mode.
    pub records_skipped: usize,
    /// Number of distinct parties.
    pub parties: usize,
    /// Order key comparison used for top-10 membership.
    pub order_key_mode: OrderKeyMode,
    /// Year ages are computed against.
    pub reference_year: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_keys_compare_as_numbers() {
        assert!(OrderKey::Numeric(2) < OrderKey::Numeric(10));
    }

    #[test]
    fn test_lexical_keys_compare_as_strings() {
        assert!(OrderKey::Lexical("10".to_string()) < OrderKey::Lexical("2".to_string()));
    }

    #[test]
    fn test_sex_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Sex::Female).unwrap(), "\"female\"");
        assert_eq!(Sex::Male.to_string(), "male");
    }

    #[test]
    fn test_party_report_json_keys() {
        let report = PartyReport {
            party: "Abc Party".to_string(),
            male: 1,
            female: 1,
            total: 2,
            median_age: 26.5,
            female_ratio: 0.5,
            top10_male: 1,
            top10_female: 1,
            top10_female_ratio: 0.5,
            top10_median_age: 26.5,
        };

        let value = serde_json::to_value(&report).unwrap();
        let keys: Vec<&str> = value
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();

        for key in [
            "party",
            "male",
            "female",
            "total",
            "medianAge",
            "femaleRatio",
            "top10Male",
            "top10Female",
            "top10FemaleRatio",
        ] {
            assert!(keys.contains(&key), "missing key {}", key);
        }
        assert_eq!(report.top10_total(), 2);
    }

    #[test]
    fn test_record_location_display() {
        let location = RecordLocation {
            file: PathBuf::from("all.csv"),
            row: 12,
        };
        assert_eq!(location.to_string(), "all.csv:12");
    }
}
