use std::collections::BTreeSet;
use std::path::Path;

use serde::Deserialize;

use crate::error::{AnalysisError, Result};

/// What to do when a single results file cannot be loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadErrorPolicy {
    /// Stop the whole run.
    Abort,
    /// Log the failure and continue with the next strain.
    Skip,
}

/// Fixed presentation parameters of the per-strain survival plot.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlotConfig {
    pub y_min: f64,
    pub y_max: f64,
    pub y_label: String,
    /// Figure size in inches.
    pub width_in: f64,
    pub height_in: f64,
    pub dpi: u32,
    /// Horizontal jitter of the points, as a fraction of a category's width.
    pub jitter: f64,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            y_min: -0.5,
            y_max: 4.5,
            y_label: "Max Dilution with Ratio >= 0.5".to_string(),
            width_in: 6.4,
            height_in: 4.8,
            dpi: 300,
            jitter: 0.3,
        }
    }
}

impl PlotConfig {
    /// Pixel dimensions of the rendered PNG.
    pub fn pixel_size(&self) -> (u32, u32) {
        let dpi = f64::from(self.dpi);
        (
            (self.width_in * dpi).round() as u32,
            (self.height_in * dpi).round() as u32,
        )
    }

    /// Scale a size given in points (1/72 in) to pixels at the configured DPI.
    pub fn px(&self, points: f64) -> u32 {
        (points * f64::from(self.dpi) / 72.0).round() as u32
    }
}

/// Parameters of one analysis run.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Minimum end/start area ratio for a dilution to count as surviving.
    pub survival_threshold: f64,
    /// Plate dates whose observations are dropped as known-bad batches.
    pub excluded_dates: BTreeSet<String>,
    /// Sort each sample's dilutions ascending before the max dilution scan
    /// instead of walking them in file order.
    pub sort_dilutions: bool,
    /// File name suffix of the per-strain result files.
    pub file_suffix: String,
    pub on_load_error: LoadErrorPolicy,
    pub render_plots: bool,
    pub plot: PlotConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            survival_threshold: 0.5,
            excluded_dates: BTreeSet::from(["20160614".to_string()]),
            sort_dilutions: false,
            file_suffix: "_results.csv".to_string(),
            on_load_error: LoadErrorPolicy::Abort,
            render_plots: true,
            plot: PlotConfig::default(),
        }
    }
}

impl AnalysisConfig {
    /// Read a JSON config file. Missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| AnalysisError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let config: AnalysisConfig =
            serde_json::from_str(&text).map_err(|e| AnalysisError::Config {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        config.validate().map_err(|message| AnalysisError::Config {
            path: path.to_path_buf(),
            message,
        })?;
        Ok(config)
    }

    fn validate(&self) -> core::result::Result<(), String> {
        if !self.survival_threshold.is_finite() {
            return Err("survival_threshold must be a finite number".to_string());
        }
        if self.file_suffix.is_empty() {
            return Err("file_suffix must not be empty".to_string());
        }
        if self.plot.y_min >= self.plot.y_max {
            return Err(format!(
                "plot y range {}..{} is empty",
                self.plot.y_min, self.plot.y_max
            ));
        }
        if self.plot.dpi == 0 {
            return Err("plot dpi must be positive".to_string());
        }
        let sizes = [
            ("width_in", self.plot.width_in),
            ("height_in", self.plot.height_in),
        ];
        for (name, inches) in sizes {
            if !(inches.is_finite() && inches > 0.0) {
                return Err(format!("plot {name} must be a positive number, got {inches}"));
            }
        }
        let (w, h) = self.plot.pixel_size();
        if w == 0 || h == 0 {
            return Err(format!("plot size rounds to an empty {w}x{h} px canvas"));
        }
        Ok(())
    }
}
