use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::analysis::dilution::extract_max_dilutions;
use crate::analysis::ratio::pair_observations;
use crate::analysis::summary::summarize_conditions;
use crate::config::{AnalysisConfig, LoadErrorPolicy};
use crate::data::filter::exclude_dates;
use crate::data::loader::{discover_result_files, load_strain_file};
use crate::data::model::{ConditionSummary, CrossStrainSummary, MaxDilutionResult, Observation};
use crate::error::{AnalysisError, Result};
use crate::output::plot::render_survival_plot;
use crate::output::writer::{write_max_dilutions, write_summary};

pub const SUMMARY_FILE: &str = "HU_survival_summary.csv";

pub fn max_dilutions_file(strain: &str) -> String {
    format!("{strain}_max_dilutions.csv")
}

pub fn plot_file(strain: &str) -> String {
    format!("{strain}_HU_survival.png")
}

// ---------------------------------------------------------------------------
// Per-strain analysis
// ---------------------------------------------------------------------------

/// Everything computed for one strain.
#[derive(Debug, Clone)]
pub struct StrainAnalysis {
    pub strain: String,
    /// One row per sample, ordered by sample identifier.
    pub results: Vec<MaxDilutionResult>,
    pub summary: Vec<ConditionSummary>,
    /// Paired rows removed by the date exclusion.
    pub excluded_rows: usize,
}

/// Pair, exclude, scan and summarise the observations of one strain.
pub fn analyze_observations(
    strain: &str,
    observations: &[Observation],
    config: &AnalysisConfig,
) -> StrainAnalysis {
    let mut pairing = pair_observations(observations);
    if pairing.unmatched_ends > 0 {
        warn!(
            "{strain}: dropped {} end observations with no matching start",
            pairing.unmatched_ends
        );
    }
    if pairing.duplicate_ends > 0 {
        warn!(
            "{strain}: {} end observations repeat an earlier key; using the first",
            pairing.duplicate_ends
        );
    }
    if pairing.duplicate_starts > 0 {
        warn!(
            "{strain}: {} start observations repeat an earlier key",
            pairing.duplicate_starts
        );
    }
    if pairing.missing_ratios > 0 {
        warn!(
            "{strain}: {} paired rows have no ratio (missing end or zero start area)",
            pairing.missing_ratios
        );
    }
    info!("Completed ratio calculations for strain {strain}");

    let excluded_rows = exclude_dates(&mut pairing.rows, &config.excluded_dates);
    if excluded_rows > 0 {
        debug!("{strain}: excluded {excluded_rows} rows from bad batch dates");
    }

    let results = extract_max_dilutions(
        &pairing.rows,
        config.survival_threshold,
        config.sort_dilutions,
    );
    let summary = summarize_conditions(strain, &results);

    StrainAnalysis {
        strain: strain.to_string(),
        results,
        summary,
        excluded_rows,
    }
}

/// Load, analyse and write the outputs of one result file.
fn analyze_strain_file(
    path: &Path,
    output_dir: &Path,
    config: &AnalysisConfig,
    report: &mut RunReport,
) -> Result<StrainAnalysis> {
    let data = load_strain_file(path)?;
    info!("Now analyzing strain {}", data.strain);

    let analysis = analyze_observations(&data.strain, &data.observations, config);
    let strain = analysis.strain.as_str();

    let table_path = output_dir.join(max_dilutions_file(strain));
    write_max_dilutions(&table_path, &analysis.results)?;
    report.files_written.push(table_path);

    if !config.render_plots {
        debug!("{strain}: plotting disabled");
    } else if analysis.results.is_empty() {
        warn!("{strain}: no samples left after exclusion; skipping graph");
    } else {
        let graph_path = output_dir.join(plot_file(strain));
        render_survival_plot(&graph_path, strain, &analysis.results, &config.plot).map_err(
            |source| AnalysisError::Plot {
                strain: strain.to_string(),
                source,
            },
        )?;
        info!("Created graph for strain {strain}");
        report.files_written.push(graph_path);
    }

    Ok(analysis)
}

// ---------------------------------------------------------------------------
// Whole run
// ---------------------------------------------------------------------------

/// What a run did.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub strains_analyzed: Vec<String>,
    /// Files skipped under [`LoadErrorPolicy::Skip`], with the reason.
    pub skipped: Vec<(PathBuf, String)>,
    pub files_written: Vec<PathBuf>,
    pub summary: CrossStrainSummary,
}

/// Analyse every result file in `input_dir` and write all outputs to
/// `output_dir`. Strains are processed one at a time in file name order.
pub fn run(input_dir: &Path, output_dir: &Path, config: &AnalysisConfig) -> Result<RunReport> {
    std::fs::create_dir_all(output_dir).map_err(|source| AnalysisError::OutputDir {
        path: output_dir.to_path_buf(),
        source,
    })?;

    let files = discover_result_files(input_dir, &config.file_suffix)?;
    info!("Found {} files to analyze", files.len());
    if files.is_empty() {
        warn!(
            "no *{} files in {}; writing an empty summary",
            config.file_suffix,
            input_dir.display()
        );
    }

    let mut report = RunReport::default();
    for path in &files {
        match analyze_strain_file(path, output_dir, config, &mut report) {
            Ok(analysis) => {
                report.summary.append(analysis.summary);
                report.strains_analyzed.push(analysis.strain);
            }
            Err(e) if e.is_load_failure() && config.on_load_error == LoadErrorPolicy::Skip => {
                warn!("skipping {}: {e}", path.display());
                report.skipped.push((path.clone(), e.to_string()));
            }
            Err(e) => return Err(e),
        }
    }

    let summary_path = output_dir.join(SUMMARY_FILE);
    write_summary(&summary_path, &report.summary)?;
    report.files_written.push(summary_path);

    Ok(report)
}
