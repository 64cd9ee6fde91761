//! Core traits for the hostdns system
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`IpSource`]: Determine the IPv4 address to publish
//! - [`DnsProvider`]: Zone lookup and record list/create/update via provider APIs

pub mod ip_source;
pub mod dns_provider;

pub use ip_source::{IpSource, NetInterface};
pub use dns_provider::{
    DnsProvider, DnsRecord, RecordFilter, Zone, DEFAULT_RECORD_TTL, RECORD_TYPE_A,
};
