pub mod features;
pub mod shared;

// Re-export commonly used items from features
pub use features::snapshot::{MetricsCollector, MetricsSources, Snapshot, SnapshotBuilder};
pub use features::cpu::{CoreUsage, CounterProvider, CpuReading, CpuSampler, RateCounter};
pub use features::system_info::{HostStats, HostStatsSource, MemoryProcessSummary, SystemInfoCollector};
pub use features::disk::{
    DiskEnumerator,
    VolumeDetails,
    VolumeHandle,
    VolumeSource,
    VolumeSummary,
    VolumeType,
};
pub use features::network::{
    AddressResolver,
    InterfaceInformation,
    InterfaceSource,
    RouteProbe,
    is_virtual_adapter,
};

// Re-export shared functionality
pub use shared::traits::{AsyncDataCollector, Validatable};
pub use shared::error::{CollectionError, SysMetrixError};
pub use shared::config::{OutputMode, SnapshotConfig};
pub use shared::output::render;
