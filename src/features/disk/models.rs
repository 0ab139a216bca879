use serde::{Deserialize, Serialize};

pub const DEFAULT_LABEL: &str = "Local Disk";
pub const NOT_READY_LABEL: &str = "Not Ready";
pub const READ_ERROR_LABEL: &str = "Error reading drive";
pub const NOT_READY_FORMAT: &str = "N/A";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VolumeType {
    Fixed,
    Removable,
    Network,
}

/// Capacity and identity read from a ready volume.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VolumeDetails {
    pub label: String,
    pub format: String,
    pub total_bytes: u64,
    /// Space available to the current user.
    pub free_bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeSummary {
    #[serde(rename = "DriveLetter")]
    pub identifier: String,
    #[serde(rename = "VolumeLabel")]
    pub label: String,
    #[serde(rename = "DriveType")]
    pub volume_type: VolumeType,
    #[serde(rename = "DriveFormat")]
    pub format: String,
    #[serde(rename = "TotalSizeGB")]
    pub total_gb: u64,
    #[serde(rename = "UsedSpaceGB")]
    pub used_gb: u64,
    #[serde(rename = "FreeSpaceGB")]
    pub free_gb: u64,
    #[serde(rename = "UsagePercent")]
    pub usage_percent: f64,
    #[serde(rename = "IsReady")]
    pub is_ready: bool,
}

impl VolumeSummary {
    fn empty(identifier: String, volume_type: VolumeType, is_ready: bool, label: &str, format: &str) -> Self {
        Self {
            identifier,
            label: label.to_string(),
            volume_type,
            format: format.to_string(),
            total_gb: 0,
            used_gb: 0,
            free_gb: 0,
            usage_percent: 0.0,
            is_ready,
        }
    }

    pub fn not_ready(identifier: String, volume_type: VolumeType) -> Self {
        Self::empty(identifier, volume_type, false, NOT_READY_LABEL, NOT_READY_FORMAT)
    }

    pub fn read_error(identifier: String, volume_type: VolumeType, is_ready: bool) -> Self {
        Self::empty(identifier, volume_type, is_ready, READ_ERROR_LABEL, "")
    }
}
