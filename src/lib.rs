//! HU survival analysis for spot dilution assays.
//!
//! Reads the per-strain `<strain>_results.csv` files produced by the plate
//! image analysis, computes end/start spot area ratios, finds the highest
//! dilution each sample survives at, and writes per-strain tables and plots
//! plus a cross-strain summary.

pub mod analysis;
pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod rng;

pub use config::{AnalysisConfig, LoadErrorPolicy, PlotConfig};
pub use error::AnalysisError;
pub use pipeline::{run, RunReport};
