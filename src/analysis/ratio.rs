use std::collections::{HashMap, HashSet};

use crate::data::model::{sample_id, JoinKey, Observation, PairedSample, Timepoint};

/// Paired rows of one strain plus the anomalies met while pairing.
#[derive(Debug, Clone, Default)]
pub struct Pairing {
    /// One row per start observation, in file order.
    pub rows: Vec<PairedSample>,
    /// End observations with no start observation; dropped.
    pub unmatched_ends: usize,
    /// End observations sharing a key with an earlier end; only the first is used.
    pub duplicate_ends: usize,
    /// Start observations sharing a key with an earlier start.
    pub duplicate_starts: usize,
    /// Paired rows whose ratio could not be computed.
    pub missing_ratios: usize,
}

/// `area_end / area_start`, or `None` when the quotient is undefined.
pub fn area_ratio(area_start: Option<f64>, area_end: Option<f64>) -> Option<f64> {
    let ratio = area_end? / area_start?;
    ratio.is_finite().then_some(ratio)
}

/// Left-join start observations onto end observations on
/// (date, well, strain, condition, dilution) and compute area ratios.
pub fn pair_observations(observations: &[Observation]) -> Pairing {
    let mut pairing = Pairing::default();

    let mut ends: HashMap<JoinKey, &Observation> = HashMap::new();
    for obs in observations.iter().filter(|o| o.timepoint == Timepoint::End) {
        if ends.contains_key(&obs.join_key()) {
            pairing.duplicate_ends += 1;
        } else {
            ends.insert(obs.join_key(), obs);
        }
    }

    let mut seen_starts: HashSet<JoinKey> = HashSet::new();
    for start in observations.iter().filter(|o| o.timepoint == Timepoint::Start) {
        let key = start.join_key();
        let area_end = ends.get(&key).and_then(|end| end.area);
        let ratio = area_ratio(start.area, area_end);
        if ratio.is_none() {
            pairing.missing_ratios += 1;
        }

        pairing.rows.push(PairedSample {
            sample: sample_id(&start.date, &start.well),
            date: start.date.clone(),
            well: start.well.clone(),
            strain: start.strain.clone(),
            condition: start.condition.clone(),
            dilution: start.dilution,
            area_start: start.area,
            area_end,
            ratio,
        });

        if !seen_starts.insert(key) {
            pairing.duplicate_starts += 1;
        }
    }

    pairing.unmatched_ends = ends.keys().filter(|k| !seen_starts.contains(*k)).count();
    pairing
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Dilution;

    fn obs(well: &str, dilution: Dilution, timepoint: Timepoint, area: Option<f64>) -> Observation {
        Observation {
            date: "20160701".to_string(),
            well: well.to_string(),
            strain: "WT".to_string(),
            condition: "HU".to_string(),
            dilution,
            timepoint,
            area,
        }
    }

    #[test]
    fn test_area_ratio() {
        assert_eq!(area_ratio(Some(200.0), Some(50.0)), Some(0.25));
        assert_eq!(area_ratio(Some(0.0), Some(50.0)), None);
        assert_eq!(area_ratio(Some(0.0), Some(0.0)), None);
        assert_eq!(area_ratio(None, Some(1.0)), None);
        assert_eq!(area_ratio(Some(1.0), None), None);
    }

    #[test]
    fn test_ratio_is_end_over_start() {
        let starts = [37.0, 1250.5, 0.001, 98765.4];
        let ends = [12.0, 1250.5, 3.0, 1.0];
        for (s, e) in starts.iter().zip(ends.iter()) {
            let ratio = area_ratio(Some(*s), Some(*e)).unwrap();
            assert!((ratio - e / s).abs() <= f64::EPSILON * (e / s).abs());
        }
    }

    #[test]
    fn test_left_join_semantics() {
        let observations = vec![
            obs("A1", 0, Timepoint::Start, Some(100.0)),
            obs("A1", 1, Timepoint::Start, Some(100.0)),
            obs("A1", 0, Timepoint::End, Some(60.0)),
            // no start for this one
            obs("B2", 0, Timepoint::End, Some(10.0)),
        ];

        let pairing = pair_observations(&observations);
        assert_eq!(pairing.rows.len(), 2);
        assert_eq!(pairing.rows[0].sample, "20160701 A1");
        assert_eq!(pairing.rows[0].ratio, Some(0.6));
        assert_eq!(pairing.rows[1].area_end, None);
        assert_eq!(pairing.rows[1].ratio, None);
        assert_eq!(pairing.unmatched_ends, 1);
        assert_eq!(pairing.missing_ratios, 1);
    }

    #[test]
    fn test_duplicate_end_uses_first() {
        let observations = vec![
            obs("A1", 0, Timepoint::End, Some(30.0)),
            obs("A1", 0, Timepoint::End, Some(90.0)),
            obs("A1", 0, Timepoint::Start, Some(100.0)),
        ];

        let pairing = pair_observations(&observations);
        assert_eq!(pairing.rows.len(), 1);
        assert_eq!(pairing.rows[0].ratio, Some(0.3));
        assert_eq!(pairing.duplicate_ends, 1);
        assert_eq!(pairing.unmatched_ends, 0);
    }
}
