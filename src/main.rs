use std::env;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use log::info;

use hu_survival::{run, AnalysisConfig};

const USAGE: &str = "usage: hu-survival <input_dir> <output_dir> [config.json]";

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().skip(1).collect();
    let (input_dir, output_dir, config_path) = match args.as_slice() {
        [input, output] => (PathBuf::from(input), PathBuf::from(output), None),
        [input, output, config] => (
            PathBuf::from(input),
            PathBuf::from(output),
            Some(PathBuf::from(config)),
        ),
        _ => bail!("{USAGE}"),
    };

    let config = match &config_path {
        Some(path) => AnalysisConfig::from_json_file(path)?,
        None => AnalysisConfig::default(),
    };

    let report = run(&input_dir, &output_dir, &config).with_context(|| {
        format!(
            "analysis of {} into {} failed",
            input_dir.display(),
            output_dir.display()
        )
    })?;

    info!(
        "Analyzed {} strains ({} skipped); wrote {} files, {} summary rows",
        report.strains_analyzed.len(),
        report.skipped.len(),
        report.files_written.len(),
        report.summary.len()
    );
    Ok(())
}
