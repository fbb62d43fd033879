/// Data layer: the GAP normalization and critical-value pipeline.
///
/// Architecture:
/// ```text
///  .xlsx / .csv / .json
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → RawTable
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ resolver  │  raw headers → canonical columns + zone/rate options
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ normalize │  crop exclusion & grouping → GapDataset
///   └──────────┘
///        │  (user picks zone & rate columns)
///        ▼
///   ┌──────────┐
///   │ aggregate │  per-group extremums → CriticalTable
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐          ┌──────────┐
///   │  filter   │ ───────▶ │  export   │  UTF-8 CSV
///   └──────────┘          └──────────┘
/// ```
pub mod aggregate;
pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
pub mod normalize;
pub mod resolver;
