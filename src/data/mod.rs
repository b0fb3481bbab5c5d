/// Data layer: schema, normalization, merging and summaries.
///
/// Architecture:
/// ```text
///   session exports (.csv, UTF-8 or Latin-1)
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  bytes → RawSession (header + text rows)
///   └──────────┘
///        │
///        ▼
///   ┌────────────┐   schema     resolve headers (aliases, placeholders)
///   │ normalizer  │  timestamp  ordered format matchers
///   └────────────┘   numeric    text → f64
///        │
///        ▼
///   ┌─────────────────┐
///   │ TelemetryDataset │  fragments concatenated in session order
///   └─────────────────┘
///        │
///        ├──► filter   visible sessions → sample indices
///        ├──► stats    describe() / per-session means
///        └──► export   CSV / JSON
/// ```

pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
pub mod normalizer;
pub mod numeric;
pub mod schema;
pub mod stats;
pub mod timestamp;
