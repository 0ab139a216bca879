mod counters;
mod models;
mod sampler;

pub use counters::{logical_processor_count, CounterProvider, RateCounter, SysinfoCounterProvider};
pub use models::{CoreUsage, CpuReading, UNAVAILABLE_USAGE};
pub use sampler::{AcquiredCounters, CpuSampler, PrimedCounters, SettledCounters};
