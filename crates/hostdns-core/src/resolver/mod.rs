//! Per-pass resolution steps
//!
//! - [`ip`]: pick the IPv4 address to publish from an interface snapshot
//! - [`zone`]: derive the naked domain and look up its provider zone

pub mod ip;
pub mod zone;

pub use ip::select_external_ipv4;
pub use zone::{naked_domain, resolve_zone};
