/// Data layer: typed rows, loading, and batch exclusion.
///
/// Architecture:
/// ```text
///  <strain>_results.csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  discover files, parse one file → StrainData
///   └──────────┘
///        │
///        ▼
///   ┌─────────────┐
///   │ Observation  │  one typed row per spot and timepoint
///   └─────────────┘
///        │   (paired by analysis::ratio)
///        ▼
///   ┌──────────┐
///   │  filter   │  drop known-bad batch dates
///   └──────────┘
/// ```

pub mod loader;
pub mod model;
pub mod filter;
