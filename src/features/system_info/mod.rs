mod collector;
mod models;

pub use collector::{HostStatsSource, SysinfoHostStats, SystemInfoCollector};
pub use models::{HostStats, MemoryProcessSummary, ProcessFootprint};
