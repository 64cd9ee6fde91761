// # Interface IP Source
//
// This crate provides an IP source that reads the host's own interface
// table, so the published address is whatever the host is configured with
// (no external "what is my IP" service involved).
//
// ## Implementation
//
// 1. `getifaddrs(3)` via the `nix` crate returns one entry per address
// 2. Entries are grouped per interface, keeping first-seen order
// 3. `hostdns_core::resolver::select_external_ipv4` picks the address
//
// ## Platform Support
//
// Unix only. On other platforms `current()` fails with a configuration
// error.

use hostdns_core::config::IpSourceConfig;
use hostdns_core::resolver::select_external_ipv4;
use hostdns_core::traits::{IpSource, NetInterface};
use hostdns_core::Result;

use std::net::Ipv4Addr;

/// IP source backed by the OS interface table
#[derive(Debug, Clone, Default)]
pub struct InterfaceIpSource {
    /// Only consider this interface
    interface: Option<String>,
}

impl InterfaceIpSource {
    /// Create a source that scans all interfaces
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a source restricted to one interface
    pub fn pinned(interface: impl Into<String>) -> Self {
        Self {
            interface: Some(interface.into()),
        }
    }

    /// Create a source from configuration
    pub fn from_config(config: &IpSourceConfig) -> Self {
        Self {
            interface: config.interface.clone(),
        }
    }

    /// The pinned interface, if any
    pub fn interface(&self) -> Option<&str> {
        self.interface.as_deref()
    }
}

#[async_trait::async_trait]
impl IpSource for InterfaceIpSource {
    async fn current(&self) -> Result<Ipv4Addr> {
        let interfaces = snapshot()?;
        tracing::trace!("Interface snapshot: {:?}", interfaces);
        select_external_ipv4(&interfaces, self.interface.as_deref())
    }

    fn source_name(&self) -> &'static str {
        "interface"
    }
}

/// Read the interface table
///
/// One [`NetInterface`] per interface name, in the order the OS first
/// reported it. Entries without an inet/inet6 address (e.g., link-layer)
/// still mark the interface as present.
#[cfg(unix)]
pub fn snapshot() -> Result<Vec<NetInterface>> {
    use nix::ifaddrs::getifaddrs;
    use nix::net::if_::InterfaceFlags;
    use std::net::{IpAddr, SocketAddrV4, SocketAddrV6};

    let entries = getifaddrs().map_err(|errno| hostdns_core::Error::Io(errno.into()))?;

    let mut interfaces: Vec<NetInterface> = Vec::new();
    for entry in entries {
        let address = entry.address.as_ref().and_then(|addr| {
            if let Some(sin) = addr.as_sockaddr_in() {
                Some(IpAddr::V4(*SocketAddrV4::from(*sin).ip()))
            } else {
                addr.as_sockaddr_in6()
                    .map(|sin6| IpAddr::V6(*SocketAddrV6::from(*sin6).ip()))
            }
        });

        let index = match interfaces.iter().position(|i| i.name == entry.interface_name) {
            Some(index) => index,
            None => {
                interfaces.push(
                    NetInterface::new(entry.interface_name.clone(), Vec::new())
                        .with_up(entry.flags.contains(InterfaceFlags::IFF_UP))
                        .with_loopback(entry.flags.contains(InterfaceFlags::IFF_LOOPBACK)),
                );
                interfaces.len() - 1
            }
        };

        if let Some(address) = address {
            interfaces[index].addresses.push(address);
        }
    }

    Ok(interfaces)
}

/// Read the interface table (unsupported platform)
#[cfg(not(unix))]
pub fn snapshot() -> Result<Vec<NetInterface>> {
    Err(hostdns_core::Error::config(
        "Interface IP source is only supported on Unix",
    ))
}
