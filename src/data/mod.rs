/// Data layer: core types, loading, filtering and aggregation.
///
/// Architecture:
/// ```text
///  .xlsx / .csv / .parquet / .json
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → ListingDataset
///   └──────────┘
///        │
///        ▼
///   ┌────────────────┐
///   │ ListingDataset  │  Vec<Listing>, distinct values, date bounds
///   └────────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  FilterSelection → FilteredView (row indices)
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate  │  count, mean rent, group means, volume by date
///   └───────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  charts   │  three named series for the renderer
///   └──────────┘
/// ```

pub mod aggregate;
pub mod charts;
pub mod error;
pub mod filter;
pub mod loader;
pub mod model;
