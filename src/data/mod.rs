/// Data layer: core types, loading, filtering, date normalisation, writing.
///
/// Architecture:
/// ```text
///   raw .csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Dataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  keep rows with min ≤ price ≤ max
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  dates    │  last_review → YYYY-MM-DD or missing
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  writer   │  Dataset → clean .csv
///   └──────────┘
/// ```

pub mod dates;
pub mod filter;
pub mod loader;
pub mod model;
pub mod writer;
