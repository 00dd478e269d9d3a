/// Data layer: core types, loading, matching, and export.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → ObservationTable
///   └──────────┘
///        │
///        ▼
///   ┌──────────────────┐
///   │ ObservationTable  │  rows, column order, hbond slot schema
///   └──────────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  matcher  │  base-pair + hydrogen-bond query → matching rows
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  export   │  full result set → CSV
///   └──────────┘
/// ```

pub mod export;
pub mod loader;
pub mod matcher;
pub mod model;
