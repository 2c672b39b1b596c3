#![forbid(unsafe_code)]

mod cache;
mod memory;
mod random;
mod snapshot;

pub mod runner;

pub use cache::{CacheClient, CacheError, CacheResult};
pub use memory::{FaultPlan, MemoryCache};
pub use random::{RandomSource, RandomSourceFactory, RngSource, SeededRngFactory, SequenceSource};
pub use snapshot::{
    MetricsDelta, ServerMetricsSnapshot, SnapshotError, SnapshotProvider, capture_or_default,
    diff_snapshots,
};
