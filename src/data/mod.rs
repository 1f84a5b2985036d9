/// Data layer: fetching, loading, trimming, filtering and summarising.
///
/// Architecture:
/// ```text
///   URL ──► source ──► bytes          .xlsx / .csv / .json / .parquet
///                        │                         │
///                        ▼                         ▼
///                   ┌──────────────────────────────────┐
///                   │  loader   parse → CompsTable      │
///                   └──────────────────────────────────┘
///                        │
///                        ▼
///                   ┌──────────┐
///                   │   trim    │  DM quantile band → trimmed CompsTable
///                   └──────────┘
///                        │
///                        ▼
///                   ┌──────────┐
///                   │  filter   │  sidebar predicates → row indices
///                   └──────────┘
///                        │
///                        ▼
///                   ┌──────────┐
///                   │   kpi     │  max / mean with issuer attribution
///                   └──────────┘
/// ```

pub mod error;
pub mod export;
pub mod filter;
pub mod kpi;
pub mod loader;
pub mod model;
pub mod rating;
pub mod source;
pub mod stats;
pub mod trim;
