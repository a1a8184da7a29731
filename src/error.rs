use std::path::PathBuf;

use thiserror::Error;

use crate::output::plot::PlotError;

/// Failures that stop (or, for loads, may skip) part of an analysis run.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("cannot read input directory {path}: {source}")]
    InputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to load {path}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{path}: {message}")]
    Schema { path: PathBuf, message: String },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("failed to create output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to plot strain {strain}: {source}")]
    Plot {
        strain: String,
        #[source]
        source: PlotError,
    },

    #[error("invalid config {path}: {message}")]
    Config { path: PathBuf, message: String },
}

impl AnalysisError {
    /// Load failures are the only ones a run may skip past.
    pub fn is_load_failure(&self) -> bool {
        matches!(self, AnalysisError::Load { .. } | AnalysisError::Schema { .. })
    }
}

pub type Result<T> = core::result::Result<T, AnalysisError>;
