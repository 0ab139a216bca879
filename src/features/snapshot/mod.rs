mod collector;
mod models;

pub use collector::{MetricsCollector, MetricsSources};
pub use models::{Snapshot, SnapshotBuilder, TIMESTAMP_FORMAT};
