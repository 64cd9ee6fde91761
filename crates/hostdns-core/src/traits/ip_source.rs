// # IP Source Trait
//
// Defines the interface for determining the address to publish.
//
// ## Implementations
//
// - Interface table (`getifaddrs`): `hostdns-ip-iface` crate
//
// ## Usage
//
// ```rust,ignore
// use hostdns_core::IpSource;
//
// let ip = source.current().await?;
// println!("publishing {ip}");
// ```

use async_trait::async_trait;
use std::net::{IpAddr, Ipv4Addr};

/// Snapshot of one network interface
///
/// Addresses are kept in the order the OS reported them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetInterface {
    /// Interface name (e.g., "eth0")
    pub name: String,
    /// Interface is administratively up
    pub is_up: bool,
    /// Interface is a loopback device
    pub is_loopback: bool,
    /// Assigned addresses
    pub addresses: Vec<IpAddr>,
}

impl NetInterface {
    /// Create an up, non-loopback interface with the given addresses
    pub fn new(name: impl Into<String>, addresses: Vec<IpAddr>) -> Self {
        Self {
            name: name.into(),
            is_up: true,
            is_loopback: false,
            addresses,
        }
    }

    /// Set the up flag
    pub fn with_up(mut self, is_up: bool) -> Self {
        self.is_up = is_up;
        self
    }

    /// Set the loopback flag
    pub fn with_loopback(mut self, is_loopback: bool) -> Self {
        self.is_loopback = is_loopback;
        self
    }
}

/// Trait for IP source implementations
///
/// Called once per reconciliation pass. Implementations must not cache
/// results between calls.
///
/// # Returns
///
/// - `Ok(Ipv4Addr)`: The address to publish
/// - `Err(Error::NoAddressFound)`: If no usable address exists
#[async_trait]
pub trait IpSource: Send + Sync {
    /// Get the current IPv4 address
    async fn current(&self) -> Result<Ipv4Addr, crate::Error>;

    /// Get the source name (for logging/debugging)
    fn source_name(&self) -> &'static str;
}
