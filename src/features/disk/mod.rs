mod collector;
mod models;

pub use collector::{summarize_volume, DiskEnumerator, SysinfoVolumes, VolumeHandle, VolumeSource};
pub use models::{
    VolumeDetails, VolumeSummary, VolumeType, DEFAULT_LABEL, NOT_READY_FORMAT, NOT_READY_LABEL,
    READ_ERROR_LABEL,
};
