use std::path::Path;

use super::format_float;
use crate::data::model::{CrossStrainSummary, MaxDilutionResult};
use crate::error::{AnalysisError, Result};

// ---------------------------------------------------------------------------
// <strain>_max_dilutions.csv
// ---------------------------------------------------------------------------

const MAX_DILUTION_HEADER: [&str; 7] =
    ["", "Sample", "Date", "Well", "Strain", "Condition", "Max Dilution"];

/// Write one strain's max dilution table with a leading row index column.
pub fn write_max_dilutions(path: &Path, results: &[MaxDilutionResult]) -> Result<()> {
    write_csv(path, |writer| {
        writer.write_record(MAX_DILUTION_HEADER)?;
        for (i, r) in results.iter().enumerate() {
            writer.write_record([
                i.to_string().as_str(),
                r.sample.as_str(),
                r.date.as_str(),
                r.well.as_str(),
                r.strain.as_str(),
                r.condition.as_str(),
                r.max_dilution.to_string().as_str(),
            ])?;
        }
        Ok(())
    })
}

/// Read back a table written by [`write_max_dilutions`]. The index column is
/// ignored.
pub fn read_max_dilutions(path: &Path) -> Result<Vec<MaxDilutionResult>> {
    let load_err = |source| AnalysisError::Load {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = csv::Reader::from_path(path).map_err(load_err)?;
    reader
        .deserialize()
        .collect::<core::result::Result<Vec<MaxDilutionResult>, _>>()
        .map_err(load_err)
}

// ---------------------------------------------------------------------------
// HU_survival_summary.csv
// ---------------------------------------------------------------------------

/// Write the cross-strain summary. One count column per max dilution value
/// seen in any strain; cells are empty where a condition has no sample at
/// that value.
pub fn write_summary(path: &Path, summary: &CrossStrainSummary) -> Result<()> {
    let levels = summary.levels();

    write_csv(path, |writer| {
        let mut header: Vec<String> = ["", "Condition", "Strain", "N", "mean", "std", "median"]
            .iter()
            .map(|h| h.to_string())
            .collect();
        header.extend(levels.iter().map(|l| l.to_string()));
        writer.write_record(&header)?;

        for (index, row) in &summary.rows {
            let mut record = vec![
                index.to_string(),
                row.condition.clone(),
                row.strain.clone(),
                row.n.to_string(),
                format_float(row.mean),
                row.std.map(format_float).unwrap_or_default(),
                format_float(row.median),
            ];
            record.extend(levels.iter().map(|level| {
                row.level_counts
                    .get(level)
                    .map(|count| count.to_string())
                    .unwrap_or_default()
            }));
            writer.write_record(&record)?;
        }
        Ok(())
    })
}

fn write_csv<F>(path: &Path, body: F) -> Result<()>
where
    F: FnOnce(&mut csv::Writer<std::fs::File>) -> csv::Result<()>,
{
    let write_err = |source| AnalysisError::Write {
        path: path.to_path_buf(),
        source,
    };
    let mut writer = csv::Writer::from_path(path).map_err(write_err)?;
    body(&mut writer).map_err(write_err)?;
    writer.flush().map_err(|e| write_err(e.into()))?;
    Ok(())
}
