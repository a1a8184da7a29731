use std::collections::BTreeMap;

use super::stats::{mean, median, sample_std};
use crate::data::model::{ConditionSummary, MaxDilutionResult};

/// Summarise one strain's max dilutions per condition.
///
/// Conditions appear in the order they are first met in `results`. Each row's
/// `level_counts` holds only the max dilution values that occur in that
/// condition.
pub fn summarize_conditions(strain: &str, results: &[MaxDilutionResult]) -> Vec<ConditionSummary> {
    let mut groups: Vec<(&str, Vec<&MaxDilutionResult>)> = Vec::new();
    for result in results {
        match groups.iter().position(|(c, _)| *c == result.condition) {
            Some(i) => groups[i].1.push(result),
            None => groups.push((result.condition.as_str(), vec![result])),
        }
    }

    groups
        .into_iter()
        .map(|(condition, members)| {
            let values: Vec<f64> = members.iter().map(|r| r.max_dilution as f64).collect();
            let mut level_counts = BTreeMap::new();
            for member in &members {
                *level_counts.entry(member.max_dilution).or_insert(0) += 1;
            }
            ConditionSummary {
                condition: condition.to_string(),
                strain: strain.to_string(),
                n: members.len(),
                mean: mean(&values).unwrap_or(f64::NAN),
                std: sample_std(&values),
                median: median(&values).unwrap_or(f64::NAN),
                level_counts,
            }
        })
        .collect()
}
