use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde::Deserialize;

use super::model::{Dilution, Observation, Timepoint};
use crate::error::{AnalysisError, Result};

// ---------------------------------------------------------------------------
// Discovery
// ---------------------------------------------------------------------------

/// List the result files in `dir` whose name ends with `suffix`, sorted by
/// file name.
pub fn discover_result_files(dir: &Path, suffix: &str) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|source| AnalysisError::InputDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| AnalysisError::InputDir {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        let matches = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|name| name.len() > suffix.len() && name.ends_with(suffix));
        if matches && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// The strain encoded in a result file name: everything before the first `_`.
pub fn strain_from_path(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_str()?;
    let (strain, _) = name.split_once('_')?;
    if strain.is_empty() {
        return None;
    }
    Some(strain.to_string())
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// One results row as written by the image analysis macro. Extra columns are
/// ignored; `Date` stays text so `20160614` is not read as a number.
#[derive(Debug, Deserialize)]
struct ResultRow {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Well")]
    well: String,
    #[serde(rename = "Time")]
    time: String,
    #[serde(rename = "Condition")]
    condition: String,
    #[serde(rename = "Dilution")]
    dilution: String,
    #[serde(rename = "Area")]
    area: Option<f64>,
}

/// Observations of one strain, in file order.
#[derive(Debug, Clone)]
pub struct StrainData {
    pub strain: String,
    pub path: PathBuf,
    pub observations: Vec<Observation>,
}

/// Load one `<strain>_results.csv` file.
///
/// Rows whose `Time` is neither `start` nor `end` are dropped with a warning;
/// everything else that does not parse is a load failure for the whole file.
pub fn load_strain_file(path: &Path) -> Result<StrainData> {
    let strain = strain_from_path(path).ok_or_else(|| AnalysisError::Schema {
        path: path.to_path_buf(),
        message: "file name has no strain prefix before '_'".to_string(),
    })?;

    let load_err = |source| AnalysisError::Load {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = csv::Reader::from_path(path).map_err(load_err)?;

    let mut observations = Vec::new();
    let mut unknown_timepoints = 0usize;

    for (row_no, result) in reader.deserialize::<ResultRow>().enumerate() {
        let row = result.map_err(load_err)?;

        let Some(timepoint) = Timepoint::parse(&row.time) else {
            debug!("{strain}: row {row_no} has unknown Time '{}'", row.time);
            unknown_timepoints += 1;
            continue;
        };

        let dilution = parse_dilution(&row.dilution).ok_or_else(|| AnalysisError::Schema {
            path: path.to_path_buf(),
            message: format!("row {row_no}: Dilution '{}' is not an integer", row.dilution),
        })?;

        observations.push(Observation {
            date: row.date.trim().to_string(),
            well: row.well.trim().to_string(),
            strain: strain.clone(),
            condition: row.condition.trim().to_string(),
            dilution,
            timepoint,
            area: row.area,
        });
    }

    if unknown_timepoints > 0 {
        warn!("{strain}: ignored {unknown_timepoints} rows with a Time other than start/end");
    }

    Ok(StrainData {
        strain,
        path: path.to_path_buf(),
        observations,
    })
}

/// Accepts `2` as well as `2.0`, which spreadsheet round trips produce.
fn parse_dilution(s: &str) -> Option<Dilution> {
    let s = s.trim();
    if let Ok(i) = s.parse::<Dilution>() {
        return Some(i);
    }
    let f = s.parse::<f64>().ok()?;
    (f.is_finite() && f.fract() == 0.0).then_some(f as Dilution)
}
