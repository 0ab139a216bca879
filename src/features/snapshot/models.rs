use serde::{Deserialize, Serialize};
use crate::features::cpu::{CoreUsage, CpuReading, UNAVAILABLE_USAGE};
use crate::features::disk::VolumeSummary;
use crate::features::system_info::MemoryProcessSummary;
use crate::shared::traits::Validatable;
use crate::shared::units::round2;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Snapshot {
    pub timestamp: String,
    pub machine_name: String,
    pub processor_count: usize,
    pub total_cpu_usage: f64,
    pub cores: Vec<CoreUsage>,
    pub system_info: MemoryProcessSummary,
    pub disk_usage: Vec<VolumeSummary>,
    pub ip_address: String,
}

fn is_percentage(value: f64) -> bool {
    (0.0..=100.0).contains(&value) && round2(value) == value
}

impl Validatable for Snapshot {
    fn validate(&self) -> Result<(), String> {
        if self.cores.len() != self.processor_count {
            return Err(format!(
                "{} core entries for {} processors",
                self.cores.len(),
                self.processor_count
            ));
        }
        if !is_percentage(self.total_cpu_usage) {
            return Err(format!("Total CPU usage {} out of range", self.total_cpu_usage));
        }
        for (index, core) in self.cores.iter().enumerate() {
            if core.core_id != index {
                return Err(format!("Core entry {} reports id {}", index, core.core_id));
            }
            if core.usage != UNAVAILABLE_USAGE && !is_percentage(core.usage) {
                return Err(format!("Core {} usage {} out of range", core.core_id, core.usage));
            }
        }
        if self.disk_usage.windows(2).any(|pair| pair[0].identifier > pair[1].identifier) {
            return Err("Volumes are not sorted by identifier".to_string());
        }
        for volume in &self.disk_usage {
            if !is_percentage(volume.usage_percent) {
                return Err(format!("Volume {} usage {} out of range", volume.identifier, volume.usage_percent));
            }
            if volume.used_gb + volume.free_gb > volume.total_gb && volume.total_gb > 0 {
                return Err(format!("Volume {} reports more space than its capacity", volume.identifier));
            }
        }
        Ok(())
    }
}

/// Assembles a snapshot from the gathered sub-collector results. Fields that
/// were never supplied take their degraded defaults.
#[derive(Default)]
pub struct SnapshotBuilder {
    timestamp: String,
    machine_name: String,
    processor_count: usize,
    cpu: Option<CpuReading>,
    system_info: Option<MemoryProcessSummary>,
    disk_usage: Option<Vec<VolumeSummary>>,
    ip_address: Option<String>,
}

impl SnapshotBuilder {
    pub fn new(timestamp: String, machine_name: String, processor_count: usize) -> Self {
        Self {
            timestamp,
            machine_name,
            processor_count,
            ..Self::default()
        }
    }

    pub fn cpu(mut self, cpu: CpuReading) -> Self {
        self.cpu = Some(cpu);
        self
    }

    pub fn system_info(mut self, system_info: MemoryProcessSummary) -> Self {
        self.system_info = Some(system_info);
        self
    }

    pub fn disk_usage(mut self, disk_usage: Vec<VolumeSummary>) -> Self {
        self.disk_usage = Some(disk_usage);
        self
    }

    pub fn ip_address(mut self, ip_address: String) -> Self {
        self.ip_address = Some(ip_address);
        self
    }

    pub fn build(self) -> Snapshot {
        let processor_count = self.processor_count;
        let mut cpu = self
            .cpu
            .unwrap_or_else(|| CpuReading::unavailable(processor_count));
        // One entry per processor, whatever the sampler returned.
        cpu.cores.truncate(processor_count);
        while cpu.cores.len() < processor_count {
            cpu.cores.push(CoreUsage::unavailable(cpu.cores.len()));
        }

        Snapshot {
            timestamp: self.timestamp,
            machine_name: self.machine_name,
            processor_count,
            total_cpu_usage: cpu.total_usage,
            cores: cpu.cores,
            system_info: self.system_info.unwrap_or_default(),
            disk_usage: self.disk_usage.unwrap_or_default(),
            ip_address: self.ip_address.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::disk::VolumeType;

    fn volume(identifier: &str, usage_percent: f64) -> VolumeSummary {
        VolumeSummary {
            identifier: identifier.to_string(),
            label: "Local Disk".to_string(),
            volume_type: VolumeType::Fixed,
            format: "NTFS".to_string(),
            total_gb: 100,
            used_gb: 50,
            free_gb: 50,
            usage_percent,
            is_ready: true,
        }
    }

    fn builder() -> SnapshotBuilder {
        SnapshotBuilder::new("2024-01-01 12:00:00".to_string(), "host".to_string(), 2)
    }

    #[test]
    fn missing_fields_take_defaults() {
        let snapshot = builder().build();

        assert_eq!(snapshot.cores, vec![CoreUsage::unavailable(0), CoreUsage::unavailable(1)]);
        assert_eq!(snapshot.total_cpu_usage, 0.0);
        assert_eq!(snapshot.system_info, MemoryProcessSummary::default());
        assert!(snapshot.disk_usage.is_empty());
        assert_eq!(snapshot.ip_address, "");
        assert!(snapshot.is_valid());
    }

    #[test]
    fn core_list_is_padded_to_processor_count() {
        let reading = CpuReading {
            total_usage: 10.0,
            cores: vec![CoreUsage { core_id: 0, usage: 12.5 }],
        };

        let snapshot = builder().cpu(reading).build();

        assert_eq!(snapshot.cores.len(), 2);
        assert_eq!(snapshot.cores[1], CoreUsage::unavailable(1));
    }

    #[test]
    fn unsorted_volumes_fail_validation() {
        let snapshot = builder().disk_usage(vec![volume("D:\\", 50.0), volume("C:\\", 50.0)]).build();
        assert!(snapshot.validate().unwrap_err().contains("sorted"));
    }

    #[test]
    fn unrounded_percentage_fails_validation() {
        let snapshot = builder().disk_usage(vec![volume("C:\\", 33.333)]).build();
        assert!(!snapshot.is_valid());
    }

    #[test]
    fn serializes_with_wire_names() {
        let value = serde_json::to_value(builder().ip_address("10.0.0.2".to_string()).build()).unwrap();
        let object = value.as_object().unwrap();

        for key in [
            "Timestamp",
            "MachineName",
            "ProcessorCount",
            "TotalCpuUsage",
            "Cores",
            "SystemInfo",
            "DiskUsage",
            "IpAddress",
        ] {
            assert!(object.contains_key(key), "missing {}", key);
        }
        assert_eq!(object["IpAddress"], "10.0.0.2");
    }
}
