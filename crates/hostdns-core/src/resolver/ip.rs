//! IPv4 address selection over an interface snapshot

use crate::error::{Error, Result};
use crate::traits::NetInterface;
use std::net::{IpAddr, Ipv4Addr};
use tracing::{debug, warn};

/// Select the external-facing IPv4 address from an interface snapshot
///
/// Interfaces that are down or loopback are skipped. Within the remaining
/// interfaces, addresses are scanned in order and the first non-loopback
/// address representable as IPv4 wins. IPv4-mapped IPv6 addresses count as
/// IPv4.
///
/// When `pin` is set, only the interface with that name is considered.
/// Without a pin, a warning lists the candidates that lost to the first one,
/// since the winner then depends on the platform's enumeration order.
///
/// # Errors
///
/// [`Error::NoAddressFound`] when no interface/address pair qualifies.
pub fn select_external_ipv4(interfaces: &[NetInterface], pin: Option<&str>) -> Result<Ipv4Addr> {
    let mut candidates = interfaces
        .iter()
        .filter(|iface| pin.is_none_or(|name| iface.name == name))
        .filter(|iface| iface.is_up && !iface.is_loopback)
        .flat_map(|iface| {
            iface
                .addresses
                .iter()
                .filter_map(usable_ipv4)
                .map(move |ip| (iface.name.as_str(), ip))
        });

    let Some((name, ip)) = candidates.next() else {
        return Err(match pin {
            Some(name) => Error::no_address(format!(
                "interface '{}' is missing, down, or has no IPv4 address",
                name
            )),
            None => Error::no_address("are you connected to the network?"),
        });
    };

    debug!("Selected {} on interface {}", ip, name);

    if pin.is_none() {
        let others: Vec<String> = candidates
            .map(|(other, addr)| format!("{} ({})", addr, other))
            .collect();
        if !others.is_empty() {
            warn!(
                "Multiple IPv4 candidates, using {} ({}); ignoring: {}. Set HOSTDNS_IP_INTERFACE to choose explicitly.",
                ip,
                name,
                others.join(", ")
            );
        }
    }

    Ok(ip)
}

fn usable_ipv4(addr: &IpAddr) -> Option<Ipv4Addr> {
    let v4 = match addr {
        IpAddr::V4(v4) => *v4,
        IpAddr::V6(v6) => v6.to_ipv4_mapped()?,
    };
    (!v4.is_loopback()).then_some(v4)
}
