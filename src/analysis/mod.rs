/// Analysis layer: pairing, max dilution scan, and per-condition summaries.

pub mod dilution;
pub mod ratio;
pub mod stats;
pub mod summary;
