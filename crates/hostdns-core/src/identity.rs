//! Host identity: which name the reconciler publishes

use crate::error::{Error, Result};
use std::fmt;

/// Hostname plus home domain, fixed for the lifetime of the process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostIdentity {
    hostname: String,
    home_domain: String,
}

impl HostIdentity {
    /// Create an identity from explicit parts
    ///
    /// The hostname is used as given, so a host reporting `box.lan`
    /// publishes `box.lan.<home_domain>`. A trailing dot on the home domain
    /// is dropped.
    pub fn new(hostname: &str, home_domain: &str) -> Result<Self> {
        let hostname = hostname.trim();
        if hostname.is_empty() {
            return Err(Error::hostname("hostname is empty"));
        }

        let home_domain = home_domain.trim();
        let home_domain = home_domain.strip_suffix('.').unwrap_or(home_domain);
        if home_domain.is_empty() {
            return Err(Error::config("home domain cannot be empty"));
        }

        Ok(Self {
            hostname: hostname.to_string(),
            home_domain: home_domain.to_string(),
        })
    }

    /// Create an identity using the OS hostname
    ///
    /// # Errors
    ///
    /// [`Error::HostnameUnavailable`] if the hostname cannot be read or is
    /// not valid UTF-8.
    pub fn from_system(home_domain: &str) -> Result<Self> {
        let raw = nix::unistd::gethostname().map_err(|e| Error::hostname(e.to_string()))?;
        let hostname = raw
            .into_string()
            .map_err(|raw| Error::hostname(format!("hostname is not valid UTF-8: {:?}", raw)))?;
        Self::new(&hostname, home_domain)
    }

    /// Hostname as reported or overridden
    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// Configured home domain
    pub fn home_domain(&self) -> &str {
        &self.home_domain
    }

    /// `hostname.home_domain`
    pub fn fqdn(&self) -> String {
        format!("{}.{}", self.hostname, self.home_domain)
    }
}

impl fmt::Display for HostIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.hostname, self.home_domain)
    }
}
