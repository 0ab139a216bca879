mod classify;
mod collector;
mod models;

pub use classify::is_virtual_adapter;
pub use collector::{
    parse_default_gateways, select_interface_address, AddressResolver, InterfaceSource, RouteProbe,
    SysinfoInterfaces, UdpRouteProbe,
};
pub use models::InterfaceInformation;
