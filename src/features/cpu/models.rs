use serde::{Deserialize, Serialize};

/// Reported for a core whose counter could not be acquired or read.
pub const UNAVAILABLE_USAGE: f64 = -1.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CoreUsage {
    pub core_id: usize,
    pub usage: f64,
}

impl CoreUsage {
    pub fn unavailable(core_id: usize) -> Self {
        Self {
            core_id,
            usage: UNAVAILABLE_USAGE,
        }
    }

    pub fn is_available(&self) -> bool {
        self.usage != UNAVAILABLE_USAGE
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CpuReading {
    pub total_usage: f64,
    pub cores: Vec<CoreUsage>,
}

impl CpuReading {
    /// Reading used when the sampler as a whole failed.
    pub fn unavailable(processor_count: usize) -> Self {
        Self {
            total_usage: 0.0,
            cores: (0..processor_count).map(CoreUsage::unavailable).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unavailable_reading_keeps_one_entry_per_core() {
        let reading = CpuReading::unavailable(3);
        assert_eq!(reading.total_usage, 0.0);
        assert_eq!(reading.cores.len(), 3);
        assert!(reading.cores.iter().enumerate().all(|(i, c)| c.core_id == i && !c.is_available()));
    }

    #[test]
    fn core_usage_serializes_with_wire_names() {
        let json = serde_json::to_string(&CoreUsage { core_id: 2, usage: 12.5 }).unwrap();
        assert_eq!(json, r#"{"CoreId":2,"Usage":12.5}"#);
    }
}
