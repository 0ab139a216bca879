use crate::features::network::classify::is_virtual_adapter;
use crate::features::network::models::InterfaceInformation;
use crate::shared::error::CollectionError;
use crate::shared::traits::AsyncDataCollector;
use async_trait::async_trait;
use log::{debug, info, warn};
use std::collections::HashSet;
use std::fs;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;
use std::sync::Arc;
use sysinfo::Networks;
use tokio::net::UdpSocket;
use tokio::task;

const ROUTE_TABLE: &str = "/proc/net/route";
const SYS_CLASS_NET: &str = "/sys/class/net";

const IFF_UP: u32 = 0x1;
const IFF_LOOPBACK: u32 = 0x8;
const RTF_GATEWAY: u32 = 0x2;

pub trait InterfaceSource: Send + Sync {
    fn interfaces(&self) -> Result<Vec<InterfaceInformation>, CollectionError>;
}

/// Asks the OS which local address it would use to reach `target`.
#[async_trait]
pub trait RouteProbe: Send + Sync {
    async fn local_address(&self, target: SocketAddr) -> Result<IpAddr, CollectionError>;
}

/// Names of interfaces carrying a default route with a gateway, from the
/// contents of `/proc/net/route`.
pub fn parse_default_gateways(route_table: &str) -> HashSet<String> {
    route_table
        .lines()
        .skip(1)
        .filter_map(|line| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() < 8 {
                return None;
            }
            let flags = u32::from_str_radix(fields[3], 16).ok()?;
            let is_default = fields[1] == "00000000" && fields[7] == "00000000";
            (is_default && flags & RTF_GATEWAY != 0).then(|| fields[0].to_string())
        })
        .collect()
}

fn read_interface_flags(name: &str) -> Option<u32> {
    let raw = fs::read_to_string(Path::new(SYS_CLASS_NET).join(name).join("flags")).ok()?;
    u32::from_str_radix(raw.trim().trim_start_matches("0x"), 16).ok()
}

fn read_driver_name(name: &str) -> String {
    fs::read_link(Path::new(SYS_CLASS_NET).join(name).join("device").join("driver"))
        .ok()
        .and_then(|link| link.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_default()
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SysinfoInterfaces;

impl SysinfoInterfaces {
    pub fn new() -> Self {
        Self
    }
}

impl InterfaceSource for SysinfoInterfaces {
    fn interfaces(&self) -> Result<Vec<InterfaceInformation>, CollectionError> {
        let networks = Networks::new_with_refreshed_list();
        let gateways = match fs::read_to_string(ROUTE_TABLE) {
            Ok(table) => parse_default_gateways(&table),
            Err(e) => {
                debug!("Route table unavailable ({}), no interface reports a gateway", e);
                HashSet::new()
            }
        };

        let interfaces = networks
            .iter()
            .map(|(interface_name, data)| {
                let addresses: Vec<IpAddr> = data.ip_networks().iter().map(|network| network.addr).collect();
                let flags = read_interface_flags(interface_name);
                InterfaceInformation {
                    interface_name: interface_name.to_string(),
                    description: read_driver_name(interface_name),
                    is_up: flags.map_or(true, |f| f & IFF_UP != 0),
                    is_loopback: flags.map_or_else(
                        || !addresses.is_empty() && addresses.iter().all(IpAddr::is_loopback),
                        |f| f & IFF_LOOPBACK != 0,
                    ),
                    has_default_gateway: gateways.contains(interface_name.as_str()),
                    addresses,
                }
            })
            .collect();

        Ok(interfaces)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct UdpRouteProbe;

impl UdpRouteProbe {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl RouteProbe for UdpRouteProbe {
    async fn local_address(&self, target: SocketAddr) -> Result<IpAddr, CollectionError> {
        // Connecting a datagram socket only selects a route; nothing is sent.
        let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).await?;
        socket.connect(target).await?;
        Ok(socket.local_addr()?.ip())
    }
}

/// First IPv4 address of a LAN-facing interface, scanning interfaces in name order.
pub fn select_interface_address(interfaces: &[InterfaceInformation]) -> Option<Ipv4Addr> {
    let mut candidates: Vec<&InterfaceInformation> = interfaces
        .iter()
        .filter(|i| i.is_up && !i.is_loopback && i.has_default_gateway)
        .filter(|i| !is_virtual_adapter(&i.interface_name, &i.description))
        .collect();
    candidates.sort_by(|a, b| a.interface_name.cmp(&b.interface_name));

    candidates.into_iter().find_map(|interface| {
        interface.addresses.iter().find_map(|address| match address {
            IpAddr::V4(v4) if !v4.is_loopback() && !v4.is_unspecified() => Some(*v4),
            _ => None,
        })
    })
}

pub struct AddressResolver {
    interfaces: Arc<dyn InterfaceSource>,
    probe: Arc<dyn RouteProbe>,
    probe_target: SocketAddr,
}

impl AddressResolver {
    pub fn new(interfaces: Arc<dyn InterfaceSource>, probe: Arc<dyn RouteProbe>, probe_target: SocketAddr) -> Self {
        Self {
            interfaces,
            probe,
            probe_target,
        }
    }

    async fn scan_interfaces(&self) -> Result<Option<Ipv4Addr>, CollectionError> {
        let source = Arc::clone(&self.interfaces);
        let interfaces = task::spawn_blocking(move || source.interfaces()).await??;
        debug!("Scanned {} network interfaces", interfaces.len());
        Ok(select_interface_address(&interfaces))
    }

    async fn probe_route(&self) -> Result<Ipv4Addr, CollectionError> {
        match self.probe.local_address(self.probe_target).await? {
            IpAddr::V4(v4) if !v4.is_loopback() && !v4.is_unspecified() => Ok(v4),
            other => Err(CollectionError::SystemApi(format!(
                "route probe returned unusable address {}",
                other
            ))),
        }
    }

    /// Primary IPv4 address, or an empty string when neither strategy finds one.
    pub async fn resolve(&self) -> String {
        match self.scan_interfaces().await {
            Ok(Some(address)) => {
                info!("Primary address {} found on a gateway interface", address);
                return address.to_string();
            }
            Ok(None) => debug!("No gateway interface qualified, probing route"),
            Err(e) => warn!("Interface scan failed: {}", e),
        }

        match self.probe_route().await {
            Ok(address) => {
                info!("Primary address {} found via route probe", address);
                address.to_string()
            }
            Err(e) => {
                warn!("Route probe failed: {}", e);
                String::new()
            }
        }
    }
}

#[async_trait]
impl AsyncDataCollector<String> for AddressResolver {
    fn name(&self) -> &'static str {
        "network"
    }

    async fn collect(&self) -> Result<String, CollectionError> {
        Ok(self.resolve().await)
    }
}
