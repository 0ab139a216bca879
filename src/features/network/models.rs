use std::net::IpAddr;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InterfaceInformation {
    pub interface_name: String,
    /// Driver or adapter description, empty when the OS does not expose one.
    pub description: String,
    pub is_up: bool,
    pub is_loopback: bool,
    pub has_default_gateway: bool,
    pub addresses: Vec<IpAddr>,
}
