//! Per-strain survival plot: a box per condition with the individual samples
//! drawn on top as jittered points.
//!
//! Each plot owns its own [`RenderContext`]; nothing is shared between strains.

use std::path::Path;

use plotters::coord::Shift;
use plotters::prelude::*;
use thiserror::Error;

use crate::analysis::stats::{median, quantile};
use crate::color::generate_palette;
use crate::config::PlotConfig;
use crate::data::model::MaxDilutionResult;
use crate::rng::SimpleRng;

/// Errors that can occur during plot generation
#[derive(Error, Debug)]
pub enum PlotError {
    #[error("Failed to create drawing area: {0}")]
    DrawingArea(String),

    #[error("Failed to configure chart: {0}")]
    ChartConfig(String),

    #[error("Failed to draw chart elements: {0}")]
    Drawing(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

type Result<T> = core::result::Result<T, PlotError>;

const JITTER_SEED: u64 = 42;
/// Half the width of a box, in category units.
const BOX_HALF_WIDTH: f64 = 0.4;

fn drawing_err(e: impl std::fmt::Display) -> PlotError {
    PlotError::Drawing(e.to_string())
}

// ---------------------------------------------------------------------------
// Box statistics
// ---------------------------------------------------------------------------

/// Box and whisker positions of one condition.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxStats {
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    /// Most extreme values within 1.5 IQR of the box.
    pub whisker_low: f64,
    pub whisker_high: f64,
}

impl BoxStats {
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let q1 = quantile(values, 0.25)?;
        let q3 = quantile(values, 0.75)?;
        let iqr = q3 - q1;
        let (low_fence, high_fence) = (q1 - 1.5 * iqr, q3 + 1.5 * iqr);

        let whisker_low = values
            .iter()
            .copied()
            .filter(|v| *v >= low_fence)
            .fold(f64::INFINITY, f64::min);
        let whisker_high = values
            .iter()
            .copied()
            .filter(|v| *v <= high_fence)
            .fold(f64::NEG_INFINITY, f64::max);

        Some(BoxStats {
            q1,
            median: median(values)?,
            q3,
            whisker_low,
            whisker_high,
        })
    }
}

/// Max dilutions per condition, conditions in the order first met.
pub fn values_by_condition(results: &[MaxDilutionResult]) -> Vec<(String, Vec<f64>)> {
    let mut groups: Vec<(String, Vec<f64>)> = Vec::new();
    for r in results {
        let value = r.max_dilution as f64;
        match groups.iter().position(|(c, _)| *c == r.condition) {
            Some(i) => groups[i].1.push(value),
            None => groups.push((r.condition.clone(), vec![value])),
        }
    }
    groups
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// A PNG canvas for one figure. Dropping it without [`RenderContext::finish`]
/// discards the figure.
pub struct RenderContext<'a> {
    root: DrawingArea<BitMapBackend<'a>, Shift>,
    config: &'a PlotConfig,
}

impl<'a> RenderContext<'a> {
    pub fn create(output_path: &'a Path, config: &'a PlotConfig) -> Result<Self> {
        let root = BitMapBackend::new(output_path, config.pixel_size()).into_drawing_area();
        root.fill(&WHITE)
            .map_err(|e| PlotError::DrawingArea(e.to_string()))?;
        Ok(Self { root, config })
    }

    /// Draw the box and point layers for `groups` under `title`.
    pub fn draw_survival(&self, title: &str, groups: &[(String, Vec<f64>)]) -> Result<()> {
        let cfg = self.config;
        let n = groups.len();
        let names: Vec<&str> = groups.iter().map(|(c, _)| c.as_str()).collect();
        let label_for = |x: &f64| {
            let i = x.round();
            if (x - i).abs() < 1e-6 && i >= 0.0 && (i as usize) < names.len() {
                names[i as usize].to_string()
            } else {
                String::new()
            }
        };

        let mut chart = ChartBuilder::on(&self.root)
            .caption(title, ("sans-serif", cfg.px(12.0)))
            .margin(cfg.px(6.0))
            .x_label_area_size(cfg.px(28.0))
            .y_label_area_size(cfg.px(40.0))
            .build_cartesian_2d(-0.5f64..(n as f64 - 0.5), cfg.y_min..cfg.y_max)
            .map_err(|e| PlotError::ChartConfig(e.to_string()))?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .disable_y_mesh()
            .x_labels(n)
            .x_label_formatter(&label_for)
            .x_desc("Condition")
            .y_desc(cfg.y_label.clone())
            .label_style(("sans-serif", cfg.px(9.0)))
            .axis_desc_style(("sans-serif", cfg.px(10.0)))
            .draw()
            .map_err(drawing_err)?;

        let line = BLACK.stroke_width(cfg.px(0.8).max(1));
        let colors = generate_palette(n);
        let mut rng = SimpleRng::new(JITTER_SEED);

        for (i, ((_, values), color)) in groups.iter().zip(colors).enumerate() {
            let x = i as f64;
            let (left, right) = (x - BOX_HALF_WIDTH, x + BOX_HALF_WIDTH);

            if let Some(stats) = BoxStats::from_values(values) {
                chart
                    .draw_series(std::iter::once(Rectangle::new(
                        [(left, stats.q1), (right, stats.q3)],
                        color.filled(),
                    )))
                    .map_err(drawing_err)?;
                chart
                    .draw_series(std::iter::once(Rectangle::new(
                        [(left, stats.q1), (right, stats.q3)],
                        line,
                    )))
                    .map_err(drawing_err)?;

                let cap = BOX_HALF_WIDTH / 2.0;
                let segments = [
                    vec![(left, stats.median), (right, stats.median)],
                    vec![(x, stats.q3), (x, stats.whisker_high)],
                    vec![(x, stats.q1), (x, stats.whisker_low)],
                    vec![(x - cap, stats.whisker_high), (x + cap, stats.whisker_high)],
                    vec![(x - cap, stats.whisker_low), (x + cap, stats.whisker_low)],
                ];
                chart
                    .draw_series(segments.into_iter().map(|s| PathElement::new(s, line)))
                    .map_err(drawing_err)?;
            }

            let spread = cfg.jitter / 2.0;
            let points: Vec<(f64, f64)> = values
                .iter()
                .map(|v| (x + rng.uniform(-spread, spread), *v))
                .collect();
            chart
                .draw_series(
                    points
                        .into_iter()
                        .map(|p| Circle::new(p, cfg.px(2.5), BLACK.filled())),
                )
                .map_err(drawing_err)?;
        }

        Ok(())
    }

    /// Encode and write the PNG, releasing the canvas.
    pub fn finish(self) -> Result<()> {
        self.root.present().map_err(drawing_err)
    }
}

/// Render `<strain>_HU_survival.png`: max dilution by condition.
pub fn render_survival_plot(
    output_path: &Path,
    strain: &str,
    results: &[MaxDilutionResult],
    config: &PlotConfig,
) -> Result<()> {
    if results.is_empty() {
        return Err(PlotError::InvalidData(format!(
            "strain {strain} has no samples to plot"
        )));
    }
    let groups = values_by_condition(results);

    let ctx = RenderContext::create(output_path, config)?;
    ctx.draw_survival(strain, &groups)?;
    ctx.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_stats_whiskers_stop_at_fences() {
        let stats = BoxStats::from_values(&[1.0, 2.0, 2.0, 2.0, 3.0, 4.0, 4.0, 20.0]).unwrap();
        assert_eq!(stats.q1, 2.0);
        assert_eq!(stats.q3, 4.0);
        assert_eq!(stats.median, 2.5);
        assert_eq!(stats.whisker_low, 1.0);
        // 20 lies beyond q3 + 1.5 * IQR = 7
        assert_eq!(stats.whisker_high, 4.0);
    }

    #[test]
    fn test_box_stats_single_value() {
        let stats = BoxStats::from_values(&[3.0]).unwrap();
        assert_eq!(stats.q1, 3.0);
        assert_eq!(stats.whisker_low, 3.0);
        assert_eq!(stats.whisker_high, 3.0);
        assert_eq!(BoxStats::from_values(&[]), None);
    }

    #[test]
    fn test_values_by_condition() {
        let result = |condition: &str, max_dilution| MaxDilutionResult {
            sample: "s".to_string(),
            date: "d".to_string(),
            well: "w".to_string(),
            strain: "WT".to_string(),
            condition: condition.to_string(),
            max_dilution,
        };
        let groups = values_by_condition(&[result("HU", 1), result("YPD", 4), result("HU", 2)]);
        assert_eq!(
            groups,
            vec![
                ("HU".to_string(), vec![1.0, 2.0]),
                ("YPD".to_string(), vec![4.0]),
            ]
        );
    }

    /// Width and height from the IHDR chunk of a PNG file.
    fn png_size(path: &Path) -> (u32, u32) {
        let bytes = std::fs::read(path).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
        let be = |at: usize| {
            let mut word = [0u8; 4];
            word.copy_from_slice(&bytes[at..at + 4]);
            u32::from_be_bytes(word)
        };
        (be(16), be(20))
    }

    #[test]
    fn test_render_writes_png_at_configured_dpi() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("WT_HU_survival.png");
        let result = |well: &str, condition: &str, max_dilution| MaxDilutionResult {
            sample: format!("20160701 {well}"),
            date: "20160701".to_string(),
            well: well.to_string(),
            strain: "WT".to_string(),
            condition: condition.to_string(),
            max_dilution,
        };
        let results = vec![
            result("A1", "YPD", 4),
            result("A2", "YPD", 3),
            result("A3", "HU", 1),
            result("A4", "HU", 0),
            result("A5", "HU", 1),
        ];

        let config = PlotConfig::default();
        render_survival_plot(&path, "WT", &results, &config).unwrap();
        assert_eq!(png_size(&path), (1920, 1440));

        let small = PlotConfig {
            dpi: 100,
            ..PlotConfig::default()
        };
        let small_path = dir.path().join("small.png");
        render_survival_plot(&small_path, "WT", &results, &small).unwrap();
        assert_eq!(png_size(&small_path), (640, 480));
    }

    #[test]
    fn test_empty_results_rejected() {
        let err = render_survival_plot(
            Path::new("unused.png"),
            "WT",
            &[],
            &PlotConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, PlotError::InvalidData(_)));
    }
}
