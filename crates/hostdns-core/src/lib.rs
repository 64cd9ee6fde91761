// # hostdns-core
//
// Core library for the hostdns A-record reconciler.
//
// ## Architecture Overview
//
// This library keeps `<hostname>.<home-domain>` pointed at the host's IPv4
// address:
// - **IpSource**: Trait for determining the address to publish
// - **DnsProvider**: Trait for zone lookup and record list/create/update
// - **resolver**: IPv4 selection and naked-domain zone resolution
// - **Reconciler**: One pass: IP → zone → create, update, or no-op
// - **HostDnsEngine**: Fixed-interval loop with cooperative shutdown
//
// ## Design Principles
//
// 1. **Stateless Passes**: Every pass re-reads the interfaces, the zone and the records
// 2. **Single Write**: A pass issues at most one create or update
// 3. **Fail Fast**: The first failed pass stops the engine; restarts are the supervisor's job
// 4. **Library-First**: The daemon is a thin shell over this crate

pub mod traits;
pub mod resolver;
pub mod reconciler;
pub mod engine;
pub mod identity;
pub mod config;
pub mod error;

// Re-export core types for convenience
pub use traits::{DnsProvider, DnsRecord, IpSource, NetInterface, RecordFilter, Zone};
pub use reconciler::{PassOutcome, Reconciler};
pub use engine::{EngineEvent, HostDnsEngine};
pub use identity::HostIdentity;
pub use config::{EngineConfig, HostDnsConfig, IpSourceConfig, ProviderConfig};
pub use error::{Error, ProviderOperation, Result};
