/// Output layer: CSV tables and PNG plots written to the output directory.

pub mod plot;
pub mod writer;

/// Format a float for a CSV cell: integral values keep one decimal place
/// (`2.0`), non-finite values become an empty cell.
pub fn format_float(v: f64) -> String {
    if !v.is_finite() {
        String::new()
    } else if v.fract() == 0.0 {
        format!("{v:.1}")
    } else {
        format!("{v}")
    }
}
