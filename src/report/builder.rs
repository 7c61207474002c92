//! Turns a completed fold into the ordered report list.

use crate::analysis::{normalize, AnalysisError, Aggregator};
use crate::models::PartyReport;
use tracing::debug;

/// Finalize every party and order the result by headcount, largest first.
///
/// Parties with equal totals keep the order in which they were first seen.
pub fn build(aggregator: Aggregator) -> Result<Vec<PartyReport>, AnalysisError> {
    let mut reports = aggregator
        .into_parties()
        .into_iter()
        .map(|party| {
            debug!(
                "Finalizing {} ({} entries)",
                party.raw_label(),
                party.entries().len()
            );
            let mut report = party.finalize()?;
            report.party = normalize(&report.party);
            Ok(report)
        })
        .collect::<Result<Vec<_>, AnalysisError>>()?;

    sort_by_total(&mut reports);
    Ok(reports)
}

/// Stable sort, non-increasing by `total`.
pub fn sort_by_total(reports: &mut [PartyReport]) {
    reports.sort_by_key(|r| std::cmp::Reverse(r.total));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{aggregate, AnalysisOptions};
    use crate::models::{Record, SourcedRecord};
    use proptest::prelude::*;

    fn record(party: &str, order: usize) -> SourcedRecord {
        Record::new("8501234567890", party, order.to_string()).into()
    }

    #[test]
    fn test_build_normalizes_names() {
        let agg =
            aggregate(vec![record("PEOPLE'S PARTY", 1)], &AnalysisOptions::default()).unwrap();
        let reports = build(agg).unwrap();
        assert_eq!(reports[0].party, "People's Party");
    }

    #[test]
    fn test_ties_keep_first_seen_order() {
        let agg = aggregate(
            vec![
                record("ZULU", 1),
                record("ALPHA", 1),
                record("MIKE", 1),
                record("MIKE", 2),
            ],
            &AnalysisOptions::default(),
        )
        .unwrap();

        let names: Vec<String> = build(agg).unwrap().into_iter().map(|r| r.party).collect();
        assert_eq!(names, vec!["Mike", "Zulu", "Alpha"]);
    }

    #[test]
    fn test_empty_input_gives_empty_report() {
        let agg = aggregate(Vec::new(), &AnalysisOptions::default()).unwrap();
        assert!(build(agg).unwrap().is_empty());
    }

    proptest! {
        #[test]
        fn prop_output_non_increasing(parties in proptest::collection::vec(0usize..6, 0..80)) {
            let records: Vec<SourcedRecord> = parties
                .iter()
                .enumerate()
                .map(|(i, p)| record(&format!("PARTY {}", p), i))
                .collect();

            let reports = build(aggregate(records, &AnalysisOptions::default()).unwrap()).unwrap();
            for pair in reports.windows(2) {
                prop_assert!(pair[0].total >= pair[1].total);
            }
        }
    }
}
