use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Dilution index of a spot (0 = undiluted).
pub type Dilution = i64;

// ---------------------------------------------------------------------------
// Timepoint – start / end of the HU exposure
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timepoint {
    Start,
    End,
}

impl Timepoint {
    /// Parse the `Time` column. Anything other than `start`/`end` is `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "start" => Some(Timepoint::Start),
            "end" => Some(Timepoint::End),
            _ => None,
        }
    }
}

impl fmt::Display for Timepoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Timepoint::Start => write!(f, "start"),
            Timepoint::End => write!(f, "end"),
        }
    }
}

// ---------------------------------------------------------------------------
// Observation – one row of a `<strain>_results.csv` file
// ---------------------------------------------------------------------------

/// A single measured spot.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    /// Plate date, kept as text (`20160614`, not a number).
    pub date: String,
    pub well: String,
    /// Derived from the file name, never from the `Strain` column.
    pub strain: String,
    pub condition: String,
    pub dilution: Dilution,
    pub timepoint: Timepoint,
    /// Spot area in pixels. `None` when the cell was empty.
    pub area: Option<f64>,
}

impl Observation {
    /// The key start and end observations are joined on.
    pub fn join_key(&self) -> JoinKey {
        JoinKey {
            date: self.date.clone(),
            well: self.well.clone(),
            strain: self.strain.clone(),
            condition: self.condition.clone(),
            dilution: self.dilution,
        }
    }
}

/// (date, well, strain, condition, dilution)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JoinKey {
    pub date: String,
    pub well: String,
    pub strain: String,
    pub condition: String,
    pub dilution: Dilution,
}

/// Composite sample identifier: `"<date> <well>"`.
pub fn sample_id(date: &str, well: &str) -> String {
    format!("{date} {well}")
}

// ---------------------------------------------------------------------------
// PairedSample – start joined with end
// ---------------------------------------------------------------------------

/// A start observation left-joined with its end observation.
#[derive(Debug, Clone, PartialEq)]
pub struct PairedSample {
    pub sample: String,
    pub date: String,
    pub well: String,
    pub strain: String,
    pub condition: String,
    pub dilution: Dilution,
    pub area_start: Option<f64>,
    /// `None` when no end observation matched.
    pub area_end: Option<f64>,
    /// `area_end / area_start`; `None` when either side is missing or the
    /// quotient is not finite.
    pub ratio: Option<f64>,
}

// ---------------------------------------------------------------------------
// MaxDilutionResult – one row of `<strain>_max_dilutions.csv`
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaxDilutionResult {
    #[serde(rename = "Sample")]
    pub sample: String,
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Well")]
    pub well: String,
    #[serde(rename = "Strain")]
    pub strain: String,
    #[serde(rename = "Condition")]
    pub condition: String,
    #[serde(rename = "Max Dilution")]
    pub max_dilution: Dilution,
}

// ---------------------------------------------------------------------------
// ConditionSummary – one row of `HU_survival_summary.csv`
// ---------------------------------------------------------------------------

/// Aggregated max dilutions for one (strain, condition).
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionSummary {
    pub condition: String,
    pub strain: String,
    pub n: usize,
    pub mean: f64,
    /// Sample standard deviation; `None` for fewer than two samples.
    pub std: Option<f64>,
    pub median: f64,
    /// Number of samples at each max dilution value seen in this condition.
    pub level_counts: BTreeMap<Dilution, usize>,
}

/// Summary rows of every strain, in the order the strains were analysed.
///
/// Each row keeps the index it had within its strain's own summary, which is
/// what ends up in the leading index column of the written file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrossStrainSummary {
    pub rows: Vec<(usize, ConditionSummary)>,
}

impl CrossStrainSummary {
    /// Append one strain's summary rows.
    pub fn append(&mut self, strain_rows: Vec<ConditionSummary>) {
        self.rows.extend(strain_rows.into_iter().enumerate());
    }

    /// Every max dilution level present in any row, ascending.
    pub fn levels(&self) -> Vec<Dilution> {
        let mut levels: Vec<Dilution> = self
            .rows
            .iter()
            .flat_map(|(_, row)| row.level_counts.keys().copied())
            .collect();
        levels.sort_unstable();
        levels.dedup();
        levels
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
