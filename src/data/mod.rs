/// Data layer: fetching, loading, merging, and filtering.
///
/// Pipeline:
/// ```text
///  remote links (per ring)
///        │
///        ▼
///   ┌──────────┐
///   │  fetch    │  download to cache dir, reuse existing files
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  CSV → Vec<Reading>, tagged historical/recent
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  merge    │  recent overrides historical, row-granular
///   └──────────┘
///        │
///        ▼
///   ┌────────────┐
///   │ RingDataset │  one continuous series per ring
///   └────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  date range + ring/type selection → view + stats
///   └──────────┘
/// ```

pub mod fetch;
pub mod filter;
pub mod ingest;
pub mod loader;
pub mod merge;
pub mod model;
