//! Reconciliation pass
//!
//! One pass makes the provider's A record for the host FQDN match the
//! host's current IPv4 address:
//!
//! ```text
//! IpSource::current() ──► resolve_zone() ──► list_records()
//!                                                 │
//!                         ┌───────────────────────┼───────────────────────┐
//!                         ▼                       ▼                       ▼
//!                   no A record             A == current ip         A != current ip
//!                   create_record()         (no-op)                 update_record()
//! ```
//!
//! Each step needs the previous step's output, so the pass is strictly
//! sequential. Nothing survives the pass: the zone and the record list are
//! fetched again next time. A pass issues at most one write.

use crate::error::{Error, ProviderOperation, Result};
use crate::identity::HostIdentity;
use crate::resolver::resolve_zone;
use crate::traits::{DnsProvider, DnsRecord, IpSource, RecordFilter, Zone, DEFAULT_RECORD_TTL};
use std::net::Ipv4Addr;
use tracing::{debug, info};

/// What a successful pass did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassOutcome {
    /// No A record existed; one was created
    Created {
        /// Published address
        ip: Ipv4Addr,
    },
    /// The A record pointed elsewhere and was updated
    Updated {
        /// Content of the record before the update
        previous: String,
        /// Published address
        ip: Ipv4Addr,
    },
    /// The A record already pointed at the current address
    Unchanged {
        /// Current address
        ip: Ipv4Addr,
    },
}

impl PassOutcome {
    /// Whether the pass wrote to the provider
    pub fn is_write(&self) -> bool {
        !matches!(self, PassOutcome::Unchanged { .. })
    }
}

/// Runs reconciliation passes for one host identity
pub struct Reconciler {
    ip_source: Box<dyn IpSource>,
    provider: Box<dyn DnsProvider>,
    identity: HostIdentity,
    record_ttl: u32,
}

impl Reconciler {
    /// Create a reconciler writing records with the default TTL (600s)
    pub fn new(
        ip_source: Box<dyn IpSource>,
        provider: Box<dyn DnsProvider>,
        identity: HostIdentity,
    ) -> Self {
        Self {
            ip_source,
            provider,
            identity,
            record_ttl: DEFAULT_RECORD_TTL,
        }
    }

    /// Override the TTL written on create and update
    pub fn with_record_ttl(mut self, record_ttl: u32) -> Self {
        self.record_ttl = record_ttl;
        self
    }

    /// The identity this reconciler publishes
    pub fn identity(&self) -> &HostIdentity {
        &self.identity
    }

    /// Run one full pass: resolve IP, resolve zone, reconcile the record
    ///
    /// Errors abort the pass unchanged in kind. IP and zone failures happen
    /// before any record call is made.
    pub async fn run_pass(&self) -> Result<PassOutcome> {
        let ip = self.ip_source.current().await?;
        debug!("Resolved IP {} via {}", ip, self.ip_source.source_name());

        let zone = resolve_zone(self.provider.as_ref(), self.identity.home_domain()).await?;

        self.reconcile_record(&zone, &self.identity.fqdn(), ip).await
    }

    /// Make the A record for `fqdn` in `zone` point at `ip`
    ///
    /// The first A-typed record returned by the provider is canonical; any
    /// other records for the name are ignored. Create and update send the
    /// same payload, so an update always resets the TTL.
    pub async fn reconcile_record(
        &self,
        zone: &Zone,
        fqdn: &str,
        ip: Ipv4Addr,
    ) -> Result<PassOutcome> {
        let records = self
            .provider
            .list_records(&zone.id, &RecordFilter::by_name(fqdn))
            .await
            .map_err(|e| Error::provider_operation(ProviderOperation::List, e))?;

        let existing = records.into_iter().find(DnsRecord::is_a);
        let desired = DnsRecord::a(fqdn, ip, self.record_ttl);

        let Some(existing) = existing else {
            info!("{} is not registered in zone {}, creating it -> {}", fqdn, zone.name, ip);
            self.provider
                .create_record(&zone.id, &desired)
                .await
                .map_err(|e| Error::provider_operation(ProviderOperation::Create, e))?;
            return Ok(PassOutcome::Created { ip });
        };

        if existing.content == desired.content {
            debug!("{} already points to {}", fqdn, ip);
            return Ok(PassOutcome::Unchanged { ip });
        }

        let record_id = existing.id.as_deref().ok_or_else(|| {
            Error::provider_operation(
                ProviderOperation::Update,
                Error::provider(self.provider.provider_name(), "listed record has no ID"),
            )
        })?;
        info!(
            "Content of {} is stale ({}), updating -> {}",
            fqdn, existing.content, ip
        );
        self.provider
            .update_record(&zone.id, record_id, &desired)
            .await
            .map_err(|e| Error::provider_operation(ProviderOperation::Update, e))?;

        Ok(PassOutcome::Updated {
            previous: existing.content,
            ip,
        })
    }
}
