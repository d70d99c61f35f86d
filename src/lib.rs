// src/lib.rs
// Public library surface for the binaries and integration tests.

pub mod aggregate;
pub mod analyze;
pub mod dashboard;
pub mod ingest;
pub mod keywords;
pub mod liquidity;
pub mod narrative;
pub mod record;
pub mod settings;
pub mod store;

// ---- Re-exports for stable public API ----
pub use crate::aggregate::{Bucket, BucketScores, DailyAggregate};
pub use crate::analyze::{classify, FilterStats, Verdict};
pub use crate::ingest::types::{FeedEntry, FeedSource};
pub use crate::ingest::{run_scan, run_scan_with, ScanConfig, ScanEvent, ScanOutcome};
pub use crate::keywords::KeywordTable;
pub use crate::narrative::{render_brief, write_brief, Regime};
pub use crate::record::HeadlineRecord;
pub use crate::settings::Settings;
pub use crate::store::{IntelLog, LoadStats, SeenLinks};
