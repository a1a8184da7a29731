//! Writes synthetic `<strain>_results.csv` files for trying out the analysis.
//!
//! usage: generate_sample [output_dir]

use std::path::PathBuf;

use hu_survival::rng::SimpleRng;

/// Surviving fraction of a spot's area after HU exposure, falling off with
/// dilution faster for sensitive strains.
fn survival_ratio(dilution: i64, sensitivity: f64, rng: &mut SimpleRng) -> f64 {
    let base = 1.0 - sensitivity * dilution as f64;
    (base + rng.gauss(0.0, 0.08)).clamp(0.0, 1.3)
}

fn main() {
    let output_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("sample_data"));
    std::fs::create_dir_all(&output_dir).expect("Failed to create output directory");

    let mut rng = SimpleRng::new(42);

    // (strain, sensitivity to HU)
    let strains = [("WT", 0.05), ("rad53", 0.35), ("0427", 0.2)];
    // (condition, extra sensitivity)
    let conditions = [("YPD", 0.0), ("HU 100mM", 0.1), ("HU 200mM", 0.2)];
    let dates = ["20160610", "20160614", "20160621"];
    let wells_per_condition = 4;
    let dilutions = 0..5;

    for (strain, sensitivity) in strains {
        let path = output_dir.join(format!("{strain}_results.csv"));
        let mut writer = csv::Writer::from_path(&path).expect("Failed to create results file");
        writer
            .write_record(["Label", "Date", "Well", "Time", "Condition", "Dilution", "Area"])
            .expect("Failed to write header");

        let mut rows = 0usize;
        for date in dates {
            for (c_idx, &(condition, extra)) in conditions.iter().enumerate() {
                for w in 0..wells_per_condition {
                    let well = format!("{}{}", (b'A' + c_idx as u8) as char, w + 1);
                    for dilution in dilutions.clone() {
                        let area_start = rng.uniform(800.0, 1200.0) / (dilution + 1) as f64;
                        let ratio = survival_ratio(dilution, sensitivity + extra, &mut rng);
                        let area_end = area_start * ratio;

                        for (time, area) in [("start", area_start), ("end", area_end)] {
                            let label = format!("{date} {well} {time}.jpg");
                            writer
                                .write_record([
                                    label.as_str(),
                                    date,
                                    well.as_str(),
                                    time,
                                    condition,
                                    dilution.to_string().as_str(),
                                    format!("{area:.1}").as_str(),
                                ])
                                .expect("Failed to write row");
                            rows += 1;
                        }
                    }
                }
            }
        }
        writer.flush().expect("Failed to flush results file");
        println!("Wrote {rows} rows to {}", path.display());
    }
}
