//! Naked-domain derivation and zone lookup

use crate::error::{Error, Result};
use crate::traits::{DnsProvider, Zone};
use tracing::debug;

/// Derive the naked (two-label) domain
///
/// `example.com` stays `example.com`, `home.example.com` becomes
/// `example.com`. A single trailing dot is accepted. Multi-label public
/// suffixes are not special-cased: `example.co.uk` becomes `co.uk`.
///
/// # Errors
///
/// [`Error::InvalidDomain`] when fewer than two non-empty labels remain.
pub fn naked_domain(domain: &str) -> Result<String> {
    let trimmed = domain.strip_suffix('.').unwrap_or(domain);
    let labels: Vec<&str> = trimmed.split('.').collect();
    if labels.len() < 2 {
        return Err(Error::invalid_domain(domain));
    }

    let naked = &labels[labels.len() - 2..];
    if naked.iter().any(|label| label.is_empty()) {
        return Err(Error::invalid_domain(domain));
    }

    Ok(naked.join("."))
}

/// Resolve the home domain to a provider zone
///
/// Validation happens before the provider is contacted; provider failures
/// are wrapped as [`Error::ZoneLookupFailed`]. Nothing is cached.
pub async fn resolve_zone(provider: &dyn DnsProvider, home_domain: &str) -> Result<Zone> {
    let name = naked_domain(home_domain)?;

    debug!("Looking up zone ID for {}", name);
    let id = provider
        .zone_id_by_name(&name)
        .await
        .map_err(|e| Error::zone_lookup(name.clone(), e))?;

    debug!("Found zone ID {} for {}", id, name);
    Ok(Zone { id, name })
}
