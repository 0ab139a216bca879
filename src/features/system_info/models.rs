use serde::{Deserialize, Serialize};
use crate::shared::units::{bytes_to_mb, round2};

/// Raw readings as the OS reports them.
#[derive(Debug, Clone, Default)]
pub struct HostStats {
    pub available_memory_bytes: u64,
    /// Thread count per process; `None` where the thread list was unreadable.
    pub process_threads: Vec<Option<u32>>,
    pub current_process: Option<ProcessFootprint>,
    pub uptime_secs: u64,
}

#[derive(Debug, Clone, Default)]
pub struct ProcessFootprint {
    pub memory_bytes: u64,
    pub threads: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MemoryProcessSummary {
    #[serde(rename = "AvailableMemoryMB")]
    pub available_memory_mb: u64,
    pub process_count: usize,
    pub thread_count: u64,
    #[serde(rename = "CurrentProcessMemoryMB")]
    pub current_process_memory_mb: u64,
    pub current_process_threads: u32,
    pub uptime_hours: f64,
}

impl From<&HostStats> for MemoryProcessSummary {
    fn from(stats: &HostStats) -> Self {
        let current = stats.current_process.clone().unwrap_or_default();
        Self {
            available_memory_mb: bytes_to_mb(stats.available_memory_bytes),
            process_count: stats.process_threads.len(),
            thread_count: stats
                .process_threads
                .iter()
                .map(|threads| u64::from(threads.unwrap_or(0)))
                .sum(),
            current_process_memory_mb: bytes_to_mb(current.memory_bytes),
            current_process_threads: current.threads.unwrap_or(0),
            uptime_hours: round2(stats.uptime_secs as f64 / 3600.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_raw_stats() {
        let stats = HostStats {
            available_memory_bytes: 2048 * 1024 * 1024 + 17,
            process_threads: vec![Some(4), None, Some(12), Some(1)],
            current_process: Some(ProcessFootprint {
                memory_bytes: 25 * 1024 * 1024 + 512,
                threads: Some(6),
            }),
            uptime_secs: 90_061,
        };

        let summary = MemoryProcessSummary::from(&stats);

        assert_eq!(summary.available_memory_mb, 2048);
        assert_eq!(summary.process_count, 4);
        assert_eq!(summary.thread_count, 17);
        assert_eq!(summary.current_process_memory_mb, 25);
        assert_eq!(summary.current_process_threads, 6);
        assert_eq!(summary.uptime_hours, 25.02);
    }

    #[test]
    fn missing_current_process_is_zeroed() {
        let summary = MemoryProcessSummary::from(&HostStats::default());
        assert_eq!(summary, MemoryProcessSummary::default());
    }

    #[test]
    fn serializes_with_wire_names() {
        let value = serde_json::to_value(MemoryProcessSummary::default()).unwrap();
        let mut keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            vec![
                "AvailableMemoryMB",
                "CurrentProcessMemoryMB",
                "CurrentProcessThreads",
                "ProcessCount",
                "ThreadCount",
                "UptimeHours",
            ]
        );
    }
}
