// # DNS Provider Trait
//
// Defines the capability interface the reconciler needs from a DNS provider.
//
// ## Implementations
//
// - Cloudflare: `hostdns-provider-cloudflare` crate
// - Tests: in-memory provider in `hostdns-core/tests/common`
//
// ## Usage
//
// ```rust,ignore
// use hostdns_core::{DnsProvider, DnsRecord, RecordFilter};
//
// let zone_id = provider.zone_id_by_name("example.com").await?;
// let records = provider
//     .list_records(&zone_id, &RecordFilter::by_name("box.example.com"))
//     .await?;
// ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;

/// Record type string for IPv4 address records
pub const RECORD_TYPE_A: &str = "A";

/// TTL written on every create and update (10 minutes)
pub const DEFAULT_RECORD_TTL: u32 = 600;

/// A DNS record as exchanged with the provider
///
/// `id` is assigned by the provider and is only present on records that
/// already exist. `record_type` stays a string because listing a name may
/// return records of any type (CNAME, TXT, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsRecord {
    /// Provider-assigned record ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Fully-qualified record name
    pub name: String,
    /// Record type ("A", "AAAA", "CNAME", ...)
    #[serde(rename = "type")]
    pub record_type: String,
    /// Record content; an IPv4 address for A records
    pub content: String,
    /// Time-to-live in seconds
    pub ttl: u32,
}

impl DnsRecord {
    /// Build the A record payload used for both create and update
    pub fn a(name: impl Into<String>, ip: Ipv4Addr, ttl: u32) -> Self {
        Self {
            id: None,
            name: name.into(),
            record_type: RECORD_TYPE_A.to_string(),
            content: ip.to_string(),
            ttl,
        }
    }

    /// Whether this is an A record
    pub fn is_a(&self) -> bool {
        self.record_type.eq_ignore_ascii_case(RECORD_TYPE_A)
    }
}

/// A provider zone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Zone {
    /// Provider-assigned zone ID
    pub id: String,
    /// Naked (two-label) domain name of the zone
    pub name: String,
}

/// Filter applied when listing records
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFilter {
    /// Exact record name to match
    pub name: Option<String>,
}

impl RecordFilter {
    /// Filter by exact record name
    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
        }
    }
}

/// Trait for DNS provider implementations
///
/// Exposes exactly the four calls the reconciler makes. Implementations
/// execute one API request per call and return errors unchanged; the
/// reconciler decides what to write, and the scheduler decides what happens
/// after a failure.
///
/// # Thread Safety
///
/// Implementations must be thread-safe and usable across async tasks.
///
/// # Forbidden
///
/// - Retrying or backing off on failure
/// - Caching zone IDs or records between calls
/// - Deciding whether a record needs to change
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Resolve a naked domain to the provider's zone ID
    ///
    /// # Returns
    ///
    /// - `Ok(String)`: The zone ID
    /// - `Err(Error)`: If the zone does not exist or the request failed
    async fn zone_id_by_name(&self, zone_name: &str) -> Result<String, crate::Error>;

    /// List records in a zone matching the filter
    ///
    /// Records of every type are returned; an empty list is not an error.
    async fn list_records(
        &self,
        zone_id: &str,
        filter: &RecordFilter,
    ) -> Result<Vec<DnsRecord>, crate::Error>;

    /// Create a record and return it as stored by the provider
    async fn create_record(
        &self,
        zone_id: &str,
        record: &DnsRecord,
    ) -> Result<DnsRecord, crate::Error>;

    /// Replace the record with the given ID
    async fn update_record(
        &self,
        zone_id: &str,
        record_id: &str,
        record: &DnsRecord,
    ) -> Result<(), crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}
