mod config;
mod core;
mod metrics;
pub mod recency;
mod shared;

pub use config::{CacheConfig, RecencyMode};
pub use self::core::BoundedCache;
pub use metrics::{CacheMetrics, CacheMetricsSnapshot, METRICS_TARGET};
pub use recency::{AccessLog, LinkedRecency, RecencyTracker};
pub use shared::SharedCache;
