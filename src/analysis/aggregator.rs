//! Per-party aggregation and statistics.
//!
//! Records are folded into one accumulator per raw party label. Once every
//! record has been seen, each accumulator is finalized into a
//! [`PartyReport`]. Finalization needs the complete entry list (median,
//! top-10 ranking), so it never runs during the fold.

use super::{decode, AnalysisError, AnalysisOptions, ErrorPolicy};
use crate::models::{OrderKey, OrderKeyMode, PartyReport, Record, Sex, SourcedRecord};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Number of leading list positions in the top-N breakdown.
pub const TOP_N: usize = 10;

/// One candidate as seen by its party's accumulator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub order_key: OrderKey,
    pub sex: Sex,
    pub age: i32,
}

/// Running totals for a single party label.
#[derive(Debug, Clone)]
pub struct PartyAccumulator {
    raw_label: String,
    male: usize,
    female: usize,
    entries: Vec<Entry>,
}

impl PartyAccumulator {
    fn new(raw_label: String) -> Self {
        Self {
            raw_label,
            male: 0,
            female: 0,
            entries: Vec::new(),
        }
    }

    fn push(&mut self, entry: Entry) {
        match entry.sex {
            Sex::Male => self.male += 1,
            Sex::Female => self.female += 1,
        }
        self.entries.push(entry);
    }

    fn absorb(&mut self, other: PartyAccumulator) {
        self.male += other.male;
        self.female += other.female;
        self.entries.extend(other.entries);
    }

    /// Party label exactly as it appeared in the source.
    pub fn raw_label(&self) -> &str {
        &self.raw_label
    }

    #[allow(dead_code)] // Accessor for callers inspecting an unfinished fold
    pub fn male(&self) -> usize {
        self.male
    }

    #[allow(dead_code)] // Accessor for callers inspecting an unfinished fold
    pub fn female(&self) -> usize {
        self.female
    }

    /// Entries in fold order.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Turn the accumulated entries into final statistics.
    ///
    /// `party` carries the raw label; the report builder swaps in the
    /// display name.
    pub fn finalize(mut self) -> Result<PartyReport, AnalysisError> {
        debug_assert_eq!(self.male + self.female, self.entries.len());

        // Vec::sort_by is stable, so equal keys keep fold order.
        self.entries.sort_by(|a, b| a.order_key.cmp(&b.order_key));

        let total = self.entries.len();
        let ages: Vec<i32> = self.entries.iter().map(|e| e.age).collect();
        let median_age =
            median(&ages).ok_or(AnalysisError::DivisionByZero { what: "medianAge" })?;
        let female_ratio = rounded_ratio(self.female, total, "femaleRatio")?;

        let top = &self.entries[..total.min(TOP_N)];
        let top10_female = top.iter().filter(|e| e.sex == Sex::Female).count();
        let top10_male = top.len() - top10_female;
        let top_ages: Vec<i32> = top.iter().map(|e| e.age).collect();
        let top10_median_age =
            median(&top_ages).ok_or(AnalysisError::DivisionByZero { what: "top10MedianAge" })?;
        let top10_female_ratio =
            rounded_ratio(top10_female, top10_male + top10_female, "top10FemaleRatio")?;

        Ok(PartyReport {
            party: self.raw_label,
            male: self.male,
            female: self.female,
            total,
            median_age,
            female_ratio,
            top10_male,
            top10_female,
            top10_female_ratio,
            top10_median_age,
        })
    }
}

/// Owns the label → accumulator mapping for the duration of a fold.
///
/// Accumulators are kept in first-seen order, which is the tie-break
/// order of the final report.
#[derive(Debug, Clone)]
pub struct Aggregator {
    options: AnalysisOptions,
    parties: Vec<PartyAccumulator>,
    index: HashMap<String, usize>,
    records_seen: usize,
    skipped: usize,
}

impl Aggregator {
    pub fn new(options: AnalysisOptions) -> Self {
        Self {
            options,
            parties: Vec::new(),
            index: HashMap::new(),
            records_seen: 0,
            skipped: 0,
        }
    }

    /// Fold one record into its party's accumulator.
    ///
    /// Under [`ErrorPolicy::Lenient`] a malformed record is logged and
    /// skipped instead of failing the fold.
    pub fn add(&mut self, sourced: SourcedRecord) -> Result<(), AnalysisError> {
        self.records_seen += 1;

        let entry = match self.entry_for(&sourced.record) {
            Ok(entry) => entry,
            Err(e) if e.is_record_error() && self.options.policy == ErrorPolicy::Lenient => {
                match &sourced.location {
                    Some(location) => warn!("Skipping record at {}: {}", location, e),
                    None => warn!("Skipping record {}: {}", self.records_seen, e),
                }
                self.skipped += 1;
                return Ok(());
            }
            Err(e) => {
                return Err(match sourced.location {
                    Some(location) => e.at(location),
                    None => e,
                })
            }
        };

        let label = sourced.record.party_label;
        let slot = match self.index.get(&label) {
            Some(&slot) => slot,
            None => {
                debug!("New party: {}", label);
                self.index.insert(label.clone(), self.parties.len());
                self.parties.push(PartyAccumulator::new(label));
                self.parties.len() - 1
            }
        };
        self.parties[slot].push(entry);

        Ok(())
    }

    fn entry_for(&self, record: &Record) -> Result<Entry, AnalysisError> {
        let attrs = decode(&record.identity_code, self.options.reference_year)?;
        Ok(Entry {
            order_key: order_key(&record.order_number, self.options.order_keys)?,
            sex: attrs.sex,
            age: attrs.age,
        })
    }

    /// Merge a shard folded from a later part of the input.
    ///
    /// Counts are summed and entry lists concatenated, so folding shards
    /// separately and merging them in input order gives the same result as
    /// one sequential fold.
    pub fn merge(&mut self, other: Aggregator) {
        self.records_seen += other.records_seen;
        self.skipped += other.skipped;

        for party in other.parties {
            match self.index.get(&party.raw_label) {
                Some(&slot) => self.parties[slot].absorb(party),
                None => {
                    self.index.insert(party.raw_label.clone(), self.parties.len());
                    self.parties.push(party);
                }
            }
        }
    }

    /// Accumulators in first-seen order.
    pub fn parties(&self) -> &[PartyAccumulator] {
        &self.parties
    }

    #[allow(dead_code)] // Lookup utility, used by tests and callers embedding the fold
    pub fn get(&self, raw_label: &str) -> Option<&PartyAccumulator> {
        self.index.get(raw_label).map(|&slot| &self.parties[slot])
    }

    /// Records offered to the fold, including skipped ones.
    pub fn records_seen(&self) -> usize {
        self.records_seen
    }

    /// Records dropped under the lenient policy.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Release the accumulators, ending the fold.
    pub fn into_parties(self) -> Vec<PartyAccumulator> {
        self.parties
    }
}

/// Fold a record sequence into a fresh aggregator.
pub fn aggregate(
    records: impl IntoIterator<Item = SourcedRecord>,
    options: &AnalysisOptions,
) -> Result<Aggregator, AnalysisError> {
    let mut aggregator = Aggregator::new(*options);
    for record in records {
        aggregator.add(record)?;
    }
    Ok(aggregator)
}

/// Convert a raw order number into a comparable key.
pub fn order_key(raw: &str, mode: OrderKeyMode) -> Result<OrderKey, AnalysisError> {
    match mode {
        OrderKeyMode::Numeric => raw
            .trim()
            .parse::<i64>()
            .map(OrderKey::Numeric)
            .map_err(|_| AnalysisError::MalformedOrderNumber {
                value: raw.to_string(),
            }),
        OrderKeyMode::Lexical => Ok(OrderKey::Lexical(raw.to_string())),
    }
}

/// Standard median; the mean of the two middle values for even counts.
pub fn median(values: &[i32]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_unstable();

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] as f64 + sorted[mid] as f64) / 2.0)
    } else {
        Some(sorted[mid] as f64)
    }
}

/// `numerator / denominator` rounded to 2 decimals, half away from zero.
///
/// Rounding is done on the integers, so 1/8 gives exactly 0.13.
pub fn rounded_ratio(
    numerator: usize,
    denominator: usize,
    what: &'static str,
) -> Result<f64, AnalysisError> {
    if denominator == 0 {
        return Err(AnalysisError::DivisionByZero { what });
    }

    let (n, d) = (numerator as u128, denominator as u128);
    let hundredths = (200 * n + d) / (2 * d);
    Ok(hundredths as f64 / 100.0)
}
