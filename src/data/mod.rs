/// Data layer: records, loading, filtering and aggregation.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Dataset (immutable)
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐   ┌──────────┐
///   │    filter     │◄──│  lookup   │  label → canonical Question
///   └──────────────┘   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │  aggregate    │  year × group key → mean  (AggregatedTable)
///   └──────────────┘
///        │
///        ▼
///    charts / export
/// ```

pub mod aggregate;
pub mod export;
pub mod filter;
pub mod loader;
pub mod lookup;
pub mod model;
pub mod selection;
