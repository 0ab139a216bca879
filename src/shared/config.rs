use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::time::Duration;

/// Wait between the priming read and the real read of the CPU counters.
pub const DEFAULT_SETTLE_INTERVAL: Duration = Duration::from_millis(100);

/// Public endpoint used only to make the OS pick a route; nothing is sent to it.
pub const DEFAULT_PROBE_TARGET: SocketAddr =
    SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::new(8, 8, 8, 8), 65530));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    #[default]
    Pretty,
    Compact,
}

#[derive(Debug, Clone)]
pub struct SnapshotConfig {
    pub settle_interval: Duration,
    pub probe_target: SocketAddr,
    pub output_mode: OutputMode,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            settle_interval: DEFAULT_SETTLE_INTERVAL,
            probe_target: DEFAULT_PROBE_TARGET,
            output_mode: OutputMode::default(),
        }
    }
}
