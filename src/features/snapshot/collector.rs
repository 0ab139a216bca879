use crate::features::cpu::{
    logical_processor_count, CounterProvider, CpuReading, CpuSampler, SysinfoCounterProvider,
};
use crate::features::disk::{DiskEnumerator, SysinfoVolumes, VolumeSource};
use crate::features::network::{AddressResolver, InterfaceSource, RouteProbe, SysinfoInterfaces, UdpRouteProbe};
use crate::features::snapshot::models::{Snapshot, SnapshotBuilder, TIMESTAMP_FORMAT};
use crate::features::system_info::{HostStatsSource, SysinfoHostStats, SystemInfoCollector};
use crate::shared::config::SnapshotConfig;
use crate::shared::error::CollectionError;
use crate::shared::traits::{AsyncDataCollector, Validatable};
use chrono::Local;
use log::{error, info, warn};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// OS access used by the sub-collectors.
#[derive(Clone)]
pub struct MetricsSources {
    pub counters: Arc<dyn CounterProvider>,
    pub host_stats: Arc<dyn HostStatsSource>,
    pub volumes: Arc<dyn VolumeSource>,
    pub interfaces: Arc<dyn InterfaceSource>,
    pub route_probe: Arc<dyn RouteProbe>,
}

impl MetricsSources {
    pub fn system() -> Self {
        Self {
            counters: Arc::new(SysinfoCounterProvider::new()),
            host_stats: Arc::new(SysinfoHostStats::new()),
            volumes: Arc::new(SysinfoVolumes::new()),
            interfaces: Arc::new(SysinfoInterfaces::new()),
            route_probe: Arc::new(UdpRouteProbe::new()),
        }
    }
}

pub struct MetricsCollector {
    sources: MetricsSources,
    config: SnapshotConfig,
    hostname: String,
    processor_count: usize,
}

impl MetricsCollector {
    pub fn new(config: SnapshotConfig) -> Self {
        Self::with_sources(MetricsSources::system(), config, whoami::hostname(), logical_processor_count())
    }

    pub fn with_sources(sources: MetricsSources, config: SnapshotConfig, hostname: String, processor_count: usize) -> Self {
        Self {
            sources,
            config,
            hostname,
            processor_count,
        }
    }

    /// Takes one snapshot. Sub-collector failures degrade their own field
    /// and are logged; this never fails.
    pub async fn collect(&self) -> Snapshot {
        let builder = SnapshotBuilder::new(
            Local::now().format(TIMESTAMP_FORMAT).to_string(),
            self.hostname.clone(),
            self.processor_count,
        );

        let cpu = spawn_collector(CpuSampler::new(
            Arc::clone(&self.sources.counters),
            self.processor_count,
            self.config.settle_interval,
        ));
        let system_info = spawn_collector(SystemInfoCollector::new(Arc::clone(&self.sources.host_stats)));
        let disks = spawn_collector(DiskEnumerator::new(Arc::clone(&self.sources.volumes)));
        let address = spawn_collector(AddressResolver::new(
            Arc::clone(&self.sources.interfaces),
            Arc::clone(&self.sources.route_probe),
            self.config.probe_target,
        ));

        let (cpu, system_info, disks, address) = tokio::join!(
            join_collector(cpu),
            join_collector(system_info),
            join_collector(disks),
            join_collector(address),
        );

        let snapshot = builder
            .cpu(cpu.unwrap_or_else(|| CpuReading::unavailable(self.processor_count)))
            .system_info(system_info.unwrap_or_default())
            .disk_usage(disks.unwrap_or_default())
            .ip_address(address.unwrap_or_default())
            .build();

        if let Err(e) = snapshot.validate() {
            warn!("Snapshot failed validation: {}", e);
        }
        info!("Collected snapshot of {}", snapshot.machine_name);
        snapshot
    }
}

type Spawned<T> = (&'static str, JoinHandle<Result<T, CollectionError>>);

fn spawn_collector<T, C>(collector: C) -> Spawned<T>
where
    T: Send + 'static,
    C: AsyncDataCollector<T> + Send + Sync + 'static,
{
    let name = collector.name();
    (name, tokio::spawn(async move { collector.collect().await }))
}

/// Waits for one sub-collector. `None` tells the caller to substitute the
/// field's default.
async fn join_collector<T>((name, handle): Spawned<T>) -> Option<T> {
    match handle.await.map_err(CollectionError::from).and_then(|result| result) {
        Ok(value) => Some(value),
        Err(e) => {
            error!("Error getting {} metrics: {}", name, e);
            None
        }
    }
}
