use crate::features::system_info::models::{HostStats, MemoryProcessSummary, ProcessFootprint};
use crate::shared::error::CollectionError;
use crate::shared::traits::AsyncDataCollector;
use log::{info, warn};
use std::sync::Arc;
use sysinfo::{Process, ProcessRefreshKind, ProcessesToUpdate, System, ThreadKind};
use tokio::task;

pub trait HostStatsSource: Send + Sync {
    fn read(&self) -> Result<HostStats, CollectionError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SysinfoHostStats;

impl SysinfoHostStats {
    pub fn new() -> Self {
        Self
    }
}

// The task list holds every thread except the main one.
fn thread_count(process: &Process) -> Option<u32> {
    process.tasks().map(|tasks| tasks.len() as u32 + 1)
}

impl HostStatsSource for SysinfoHostStats {
    fn read(&self) -> Result<HostStats, CollectionError> {
        let mut sys = System::new();
        sys.refresh_memory();
        sys.refresh_processes_specifics(ProcessesToUpdate::All, true, ProcessRefreshKind::everything());

        // Threads of other processes show up as entries of their own on some platforms.
        let processes: Vec<&Process> = sys
            .processes()
            .values()
            .filter(|process| !matches!(process.thread_kind(), Some(ThreadKind::Userland)))
            .collect();
        if processes.is_empty() {
            return Err(CollectionError::SystemApi("No processes available".to_string()));
        }

        let current_process = match sysinfo::get_current_pid() {
            Ok(pid) => sys.process(pid).map(|process| ProcessFootprint {
                memory_bytes: process.memory(),
                threads: thread_count(process),
            }),
            Err(e) => {
                warn!("Could not determine current process id: {}", e);
                None
            }
        };

        Ok(HostStats {
            available_memory_bytes: sys.available_memory(),
            process_threads: processes.iter().map(|process| thread_count(process)).collect(),
            current_process,
            uptime_secs: System::uptime(),
        })
    }
}

pub struct SystemInfoCollector {
    source: Arc<dyn HostStatsSource>,
}

impl SystemInfoCollector {
    pub fn new(source: Arc<dyn HostStatsSource>) -> Self {
        Self { source }
    }

    pub async fn summarize(&self) -> Result<MemoryProcessSummary, CollectionError> {
        let source = Arc::clone(&self.source);
        let stats = task::spawn_blocking(move || source.read()).await??;

        let summary = MemoryProcessSummary::from(&stats);
        info!(
            "Collected system info: {} processes, {} threads",
            summary.process_count, summary.thread_count
        );
        Ok(summary)
    }
}

#[async_trait::async_trait]
impl AsyncDataCollector<MemoryProcessSummary> for SystemInfoCollector {
    fn name(&self) -> &'static str {
        "system info"
    }

    async fn collect(&self) -> Result<MemoryProcessSummary, CollectionError> {
        self.summarize().await
    }
}
