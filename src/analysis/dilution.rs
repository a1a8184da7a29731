use std::collections::HashMap;

use log::warn;

use crate::data::model::{Dilution, MaxDilutionResult, PairedSample};

/// Highest dilution whose ratio meets `threshold`, walking `steps` in the
/// order given and stopping at the first dilution that does not.
///
/// A missing ratio counts as a failure. Returns 0 when the first step fails or
/// there are no steps.
pub fn max_dilution(steps: &[(Dilution, Option<f64>)], threshold: f64) -> Dilution {
    let mut max_dil = 0;
    for (dilution, ratio) in steps {
        match ratio {
            Some(r) if *r >= threshold => max_dil = *dilution,
            _ => break,
        }
    }
    max_dil
}

/// Rows of one sample, grouped in the order samples first appear.
fn group_by_sample(rows: &[PairedSample]) -> Vec<(&str, Vec<&PairedSample>)> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(&str, Vec<&PairedSample>)> = Vec::new();
    for row in rows {
        let slot = *index.entry(row.sample.as_str()).or_insert_with(|| {
            groups.push((row.sample.as_str(), Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(row);
    }
    groups
}

/// The (dilution, ratio) steps of one sample: one step per row in file order,
/// each taking the ratio of the first row with its dilution. Sorted steps are
/// also deduplicated.
fn scan_steps(group: &[&PairedSample], sort: bool) -> Vec<(Dilution, Option<f64>)> {
    let first_ratio = |dilution: Dilution| {
        group
            .iter()
            .find(|row| row.dilution == dilution)
            .and_then(|row| row.ratio)
    };
    let mut steps: Vec<(Dilution, Option<f64>)> = group
        .iter()
        .map(|row| (row.dilution, first_ratio(row.dilution)))
        .collect();
    if sort {
        steps.sort_by_key(|(d, _)| *d);
        steps.dedup_by_key(|(d, _)| *d);
    }
    steps
}

/// Compute the max dilution of every sample.
///
/// Results are ordered by sample identifier. A sample whose rows disagree on
/// the condition yields one result per condition.
pub fn extract_max_dilutions(
    rows: &[PairedSample],
    threshold: f64,
    sort_dilutions: bool,
) -> Vec<MaxDilutionResult> {
    let mut results = Vec::new();

    for (sample, group) in group_by_sample(rows) {
        let steps = scan_steps(&group, sort_dilutions);
        if !sort_dilutions && steps.windows(2).any(|w| w[0].0 > w[1].0) {
            warn!(
                "sample {sample}: dilutions are not in ascending order ({:?}); scanning in file order",
                steps.iter().map(|(d, _)| *d).collect::<Vec<_>>()
            );
        }
        let max_dil = max_dilution(&steps, threshold);

        let mut conditions: Vec<&str> = Vec::new();
        for row in &group {
            if !conditions.contains(&row.condition.as_str()) {
                conditions.push(row.condition.as_str());
            }
        }
        if conditions.len() > 1 {
            warn!("sample {sample}: rows span several conditions {conditions:?}");
        }

        let first = group[0];
        for condition in conditions {
            results.push(MaxDilutionResult {
                sample: sample.to_string(),
                date: first.date.clone(),
                well: first.well.clone(),
                strain: first.strain.clone(),
                condition: condition.to_string(),
                max_dilution: max_dil,
            });
        }
    }

    results.sort_by(|a, b| a.sample.cmp(&b.sample));
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(well: &str, condition: &str, dilution: Dilution, ratio: Option<f64>) -> PairedSample {
        PairedSample {
            sample: format!("20160701 {well}"),
            date: "20160701".to_string(),
            well: well.to_string(),
            strain: "WT".to_string(),
            condition: condition.to_string(),
            dilution,
            area_start: Some(100.0),
            area_end: ratio.map(|r| r * 100.0),
            ratio,
        }
    }

    #[test]
    fn test_first_failure_halts() {
        let steps = [(0, Some(0.9)), (1, Some(0.7)), (2, Some(0.3)), (3, Some(0.8))];
        assert_eq!(max_dilution(&steps, 0.5), 1);
    }

    #[test]
    fn test_all_passing_gives_last() {
        let steps = [(0, Some(0.9)), (1, Some(0.5)), (2, Some(1.3)), (3, Some(0.6))];
        assert_eq!(max_dilution(&steps, 0.5), 3);
    }

    #[test]
    fn test_first_failing_gives_zero() {
        let steps = [(0, Some(0.49)), (1, Some(0.9))];
        assert_eq!(max_dilution(&steps, 0.5), 0);
        assert_eq!(max_dilution(&[], 0.5), 0);
    }

    #[test]
    fn test_missing_ratio_fails() {
        let steps = [(0, Some(0.9)), (1, None), (2, Some(0.9))];
        assert_eq!(max_dilution(&steps, 0.5), 0);
    }

    #[test]
    fn test_encounter_order_vs_sorted() {
        let rows = vec![
            row("A1", "HU", 2, Some(0.9)),
            row("A1", "HU", 0, Some(0.9)),
            row("A1", "HU", 1, Some(0.1)),
        ];
        let in_order = extract_max_dilutions(&rows, 0.5, false);
        assert_eq!(in_order[0].max_dilution, 0);

        let sorted = extract_max_dilutions(&rows, 0.5, true);
        assert_eq!(sorted[0].max_dilution, 0);

        let rows = vec![row("A1", "HU", 1, Some(0.9)), row("A1", "HU", 0, Some(0.9))];
        assert_eq!(extract_max_dilutions(&rows, 0.5, false)[0].max_dilution, 0);
        assert_eq!(extract_max_dilutions(&rows, 0.5, true)[0].max_dilution, 1);
    }

    #[test]
    fn test_results_sorted_by_sample_with_metadata() {
        let rows = vec![
            row("B1", "YPD", 0, Some(1.0)),
            row("B1", "YPD", 1, Some(0.8)),
            row("A1", "HU", 0, Some(0.2)),
        ];
        let results = extract_max_dilutions(&rows, 0.5, false);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].sample, "20160701 A1");
        assert_eq!(results[0].condition, "HU");
        assert_eq!(results[0].max_dilution, 0);
        assert_eq!(results[1].sample, "20160701 B1");
        assert_eq!(results[1].well, "B1");
        assert_eq!(results[1].strain, "WT");
        assert_eq!(results[1].max_dilution, 1);
    }

    #[test]
    fn test_repeated_levels_scanned_in_file_order() {
        let rows = vec![
            row("A1", "HU", 0, Some(0.9)),
            row("A1", "HU", 1, Some(0.9)),
            row("A1", "HU", 2, Some(0.9)),
            row("A1", "YPD", 0, Some(0.9)),
            row("A1", "YPD", 1, Some(0.9)),
        ];
        let results = extract_max_dilutions(&rows, 0.5, false);
        let max: Vec<(&str, Dilution)> = results
            .iter()
            .map(|r| (r.condition.as_str(), r.max_dilution))
            .collect();
        assert_eq!(max, vec![("HU", 1), ("YPD", 1)]);

        let sorted = extract_max_dilutions(&rows, 0.5, true);
        assert!(sorted.iter().all(|r| r.max_dilution == 2));
    }

    #[test]
    fn test_repeated_level_uses_first_ratio() {
        let rows = vec![
            row("A1", "HU", 0, Some(0.9)),
            row("A1", "HU", 1, Some(0.2)),
            row("A1", "YPD", 0, Some(0.9)),
            row("A1", "YPD", 1, Some(0.9)),
        ];
        assert!(extract_max_dilutions(&rows, 0.5, false)
            .iter()
            .all(|r| r.max_dilution == 0));
    }

    #[test]
    fn test_mixed_conditions_yield_one_row_each() {
        let rows = vec![row("A1", "HU", 0, Some(1.0)), row("A1", "YPD", 1, Some(1.0))];
        let results = extract_max_dilutions(&rows, 0.5, false);
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.max_dilution == 1));
    }
}
