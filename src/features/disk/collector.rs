use crate::features::disk::models::{VolumeDetails, VolumeSummary, VolumeType, DEFAULT_LABEL};
use crate::shared::error::CollectionError;
use crate::shared::traits::AsyncDataCollector;
use crate::shared::units::{bytes_to_gb, round2};
use futures::future::join_all;
use log::{error, info};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use sysinfo::{Disk, Disks};
use tokio::task;

const NETWORK_FILE_SYSTEMS: &[&str] = &[
    "nfs", "nfs4", "cifs", "smbfs", "smb3", "sshfs", "fuse.sshfs", "9p", "afs", "ncpfs",
];

/// One mounted volume. Reading details may touch the device and fail.
pub trait VolumeHandle: Send {
    fn identifier(&self) -> String;
    fn volume_type(&self) -> VolumeType;
    fn is_ready(&self) -> bool;
    fn details(&self) -> Result<VolumeDetails, CollectionError>;
}

pub trait VolumeSource: Send + Sync {
    fn volumes(&self) -> Result<Vec<Box<dyn VolumeHandle>>, CollectionError>;
}

struct MountedVolume {
    mount_point: PathBuf,
    name: String,
    file_system: String,
    removable: bool,
    total_space: u64,
    available_space: u64,
}

impl From<&Disk> for MountedVolume {
    fn from(disk: &Disk) -> Self {
        Self {
            mount_point: disk.mount_point().to_path_buf(),
            name: disk.name().to_string_lossy().into_owned(),
            file_system: disk.file_system().to_string_lossy().into_owned(),
            removable: disk.is_removable(),
            total_space: disk.total_space(),
            available_space: disk.available_space(),
        }
    }
}

impl VolumeHandle for MountedVolume {
    fn identifier(&self) -> String {
        self.mount_point.to_string_lossy().into_owned()
    }

    fn volume_type(&self) -> VolumeType {
        let file_system = self.file_system.to_lowercase();
        if NETWORK_FILE_SYSTEMS.contains(&file_system.as_str()) {
            VolumeType::Network
        } else if self.removable {
            VolumeType::Removable
        } else {
            VolumeType::Fixed
        }
    }

    fn is_ready(&self) -> bool {
        fs::metadata(&self.mount_point).is_ok()
    }

    fn details(&self) -> Result<VolumeDetails, CollectionError> {
        fs::read_dir(&self.mount_point)?;
        Ok(VolumeDetails {
            label: self.name.clone(),
            format: self.file_system.clone(),
            total_bytes: self.total_space,
            free_bytes: self.available_space,
        })
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SysinfoVolumes;

impl SysinfoVolumes {
    pub fn new() -> Self {
        Self
    }
}

impl VolumeSource for SysinfoVolumes {
    fn volumes(&self) -> Result<Vec<Box<dyn VolumeHandle>>, CollectionError> {
        let disks = Disks::new_with_refreshed_list();
        Ok(disks
            .list()
            .iter()
            .map(|disk| Box::new(MountedVolume::from(disk)) as Box<dyn VolumeHandle>)
            .collect())
    }
}

/// Builds the summary for one volume. Never fails: problems become
/// placeholder labels.
pub fn summarize_volume(volume: &dyn VolumeHandle) -> VolumeSummary {
    let identifier = volume.identifier();
    let volume_type = volume.volume_type();

    if !volume.is_ready() {
        return VolumeSummary::not_ready(identifier, volume_type);
    }

    match volume.details() {
        Ok(details) => {
            let total_gb = bytes_to_gb(details.total_bytes);
            let free_gb = bytes_to_gb(details.free_bytes);
            let used_gb = total_gb.saturating_sub(free_gb);
            let usage_percent = if total_gb > 0 {
                round2(used_gb as f64 / total_gb as f64 * 100.0)
            } else {
                0.0
            };
            let label = if details.label.is_empty() {
                DEFAULT_LABEL.to_string()
            } else {
                details.label
            };

            VolumeSummary {
                identifier,
                label,
                volume_type,
                format: details.format,
                total_gb,
                used_gb,
                free_gb,
                usage_percent,
                is_ready: true,
            }
        }
        Err(e) => {
            error!("Error reading drive {}: {}", identifier, e);
            VolumeSummary::read_error(identifier, volume_type, true)
        }
    }
}

pub struct DiskEnumerator {
    source: Arc<dyn VolumeSource>,
}

impl DiskEnumerator {
    pub fn new(source: Arc<dyn VolumeSource>) -> Self {
        Self { source }
    }

    pub async fn enumerate(&self) -> Result<Vec<VolumeSummary>, CollectionError> {
        let source = Arc::clone(&self.source);
        let volumes = task::spawn_blocking(move || source.volumes()).await??;

        let tasks = volumes.into_iter().map(|volume| {
            let identifier = volume.identifier();
            let volume_type = volume.volume_type();
            async move {
                match task::spawn_blocking(move || summarize_volume(volume.as_ref())).await {
                    Ok(summary) => summary,
                    Err(e) => {
                        error!("Error reading drive {}: {}", identifier, e);
                        VolumeSummary::read_error(identifier, volume_type, false)
                    }
                }
            }
        });

        let mut summaries = join_all(tasks).await;
        summaries.sort_by(|a, b| a.identifier.cmp(&b.identifier));

        info!("Found {} volumes", summaries.len());
        Ok(summaries)
    }
}

#[async_trait::async_trait]
impl AsyncDataCollector<Vec<VolumeSummary>> for DiskEnumerator {
    fn name(&self) -> &'static str {
        "disk"
    }

    async fn collect(&self) -> Result<Vec<VolumeSummary>, CollectionError> {
        self.enumerate().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::disk::models::{NOT_READY_FORMAT, NOT_READY_LABEL, READ_ERROR_LABEL};
    use std::io;

    const GB: u64 = 1024 * 1024 * 1024;

    #[derive(Clone)]
    enum State {
        Ready { label: &'static str, total: u64, free: u64 },
        NotReady,
        Denied,
        Explodes,
    }

    struct FakeVolume {
        id: &'static str,
        state: State,
    }

    impl VolumeHandle for FakeVolume {
        fn identifier(&self) -> String {
            self.id.to_string()
        }

        fn volume_type(&self) -> VolumeType {
            VolumeType::Fixed
        }

        fn is_ready(&self) -> bool {
            !matches!(self.state, State::NotReady)
        }

        fn details(&self) -> Result<VolumeDetails, CollectionError> {
            match self.state {
                State::Ready { label, total, free } => Ok(VolumeDetails {
                    label: label.to_string(),
                    format: "NTFS".to_string(),
                    total_bytes: total,
                    free_bytes: free,
                }),
                State::Denied => Err(io::Error::new(io::ErrorKind::PermissionDenied, "access denied").into()),
                State::Explodes => panic!("driver crashed"),
                State::NotReady => unreachable!("details read on a volume that is not ready"),
            }
        }
    }

    struct FakeSource(Vec<(&'static str, State)>);

    impl VolumeSource for FakeSource {
        fn volumes(&self) -> Result<Vec<Box<dyn VolumeHandle>>, CollectionError> {
            Ok(self
                .0
                .iter()
                .map(|(id, state)| Box::new(FakeVolume { id: *id, state: state.clone() }) as Box<dyn VolumeHandle>)
                .collect())
        }
    }

    struct BrokenSource;

    impl VolumeSource for BrokenSource {
        fn volumes(&self) -> Result<Vec<Box<dyn VolumeHandle>>, CollectionError> {
            Err(CollectionError::SystemApi("volume enumeration unavailable".to_string()))
        }
    }

    fn ready(label: &'static str, total: u64, free: u64) -> FakeVolume {
        FakeVolume { id: "X:\\", state: State::Ready { label, total, free } }
    }

    #[test]
    fn ready_volume_capacity_and_usage() {
        let summary = summarize_volume(&ready("System", 500 * GB + 123, 125 * GB + 9));

        assert_eq!(summary.label, "System");
        assert_eq!(summary.format, "NTFS");
        assert_eq!(summary.total_gb, 500);
        assert_eq!(summary.free_gb, 125);
        assert_eq!(summary.used_gb, 375);
        assert_eq!(summary.usage_percent, 75.0);
        assert!(summary.is_ready);
    }

    #[test]
    fn usage_is_rounded_to_two_decimals() {
        let summary = summarize_volume(&ready("Data", 3 * GB, 2 * GB));
        assert_eq!(summary.usage_percent, 33.33);
    }

    #[test]
    fn empty_label_falls_back() {
        let summary = summarize_volume(&ready("", 10 * GB, 5 * GB));
        assert_eq!(summary.label, DEFAULT_LABEL);
    }

    #[test]
    fn zero_capacity_has_zero_usage() {
        let summary = summarize_volume(&ready("Tiny", GB - 1, 0));
        assert_eq!(summary.total_gb, 0);
        assert_eq!(summary.usage_percent, 0.0);
    }

    #[test]
    fn not_ready_volume_is_zeroed() {
        let summary = summarize_volume(&FakeVolume { id: "D:\\", state: State::NotReady });

        assert_eq!(summary.label, NOT_READY_LABEL);
        assert_eq!(summary.format, NOT_READY_FORMAT);
        assert_eq!((summary.total_gb, summary.used_gb, summary.free_gb), (0, 0, 0));
        assert_eq!(summary.usage_percent, 0.0);
        assert!(!summary.is_ready);
    }

    #[test]
    fn unreadable_volume_is_kept_with_error_label() {
        let summary = summarize_volume(&FakeVolume { id: "E:\\", state: State::Denied });

        assert_eq!(summary.identifier, "E:\\");
        assert_eq!(summary.label, READ_ERROR_LABEL);
        assert_eq!(summary.total_gb, 0);
    }

    #[tokio::test]
    async fn enumerates_concurrently_and_sorts_by_identifier() {
        let source = FakeSource(vec![
            ("F:\\", State::NotReady),
            ("C:\\", State::Ready { label: "OS", total: 100 * GB, free: 40 * GB }),
            ("E:\\", State::Denied),
            ("D:\\", State::Explodes),
        ]);
        let enumerator = DiskEnumerator::new(Arc::new(source));

        let volumes = enumerator.collect().await.unwrap();

        let ids: Vec<&str> = volumes.iter().map(|v| v.identifier.as_str()).collect();
        assert_eq!(ids, vec!["C:\\", "D:\\", "E:\\", "F:\\"]);
        assert_eq!(volumes[0].usage_percent, 60.0);
        assert_eq!(volumes[1].label, READ_ERROR_LABEL);
        assert_eq!(volumes[2].label, READ_ERROR_LABEL);
        assert_eq!(volumes[3].label, NOT_READY_LABEL);
    }

    #[tokio::test]
    async fn listing_failure_is_returned() {
        let enumerator = DiskEnumerator::new(Arc::new(BrokenSource));
        assert!(enumerator.collect().await.is_err());
    }

    #[test]
    fn network_file_systems_are_typed_as_network() {
        let volume = MountedVolume {
            mount_point: PathBuf::from("/mnt/share"),
            name: "//server/share".to_string(),
            file_system: "CIFS".to_string(),
            removable: false,
            total_space: 0,
            available_space: 0,
        };
        assert_eq!(volume.volume_type(), VolumeType::Network);
    }

    #[test]
    fn missing_mount_point_is_not_ready() {
        let volume = MountedVolume {
            mount_point: PathBuf::from("/definitely/not/mounted/here"),
            name: String::new(),
            file_system: "ext4".to_string(),
            removable: true,
            total_space: 10 * GB,
            available_space: GB,
        };

        let summary = summarize_volume(&volume);

        assert_eq!(summary.volume_type, VolumeType::Removable);
        assert_eq!(summary.label, NOT_READY_LABEL);
    }
}
