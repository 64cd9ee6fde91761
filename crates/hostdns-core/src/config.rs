//! Configuration types for the hostdns system
//!
//! This module defines all configuration structures used throughout the crate.
//! Configuration is built once at startup and never mutated afterwards.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main hostdns configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostDnsConfig {
    /// Home domain the host is published under (e.g., "example.com")
    pub home_domain: String,

    /// Hostname override; the OS hostname is used when unset
    #[serde(default)]
    pub hostname: Option<String>,

    /// DNS provider configuration
    pub provider: ProviderConfig,

    /// IP source configuration
    #[serde(default)]
    pub ip_source: IpSourceConfig,

    /// Optional engine settings
    #[serde(default)]
    pub engine: EngineConfig,
}

impl HostDnsConfig {
    /// Create a configuration with default engine and IP source settings
    pub fn new(home_domain: impl Into<String>, provider: ProviderConfig) -> Self {
        Self {
            home_domain: home_domain.into(),
            hostname: None,
            provider,
            ip_source: IpSourceConfig::default(),
            engine: EngineConfig::default(),
        }
    }

    /// Validate the configuration
    ///
    /// The label count of the home domain is checked by the zone resolver on
    /// every pass, not here.
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.home_domain.trim().is_empty() {
            return Err(crate::Error::config("Home domain cannot be empty"));
        }

        if let Some(hostname) = &self.hostname
            && hostname.trim().is_empty()
        {
            return Err(crate::Error::config("Hostname override cannot be empty"));
        }

        self.provider.validate()?;
        self.ip_source.validate()?;
        self.engine.validate()?;

        Ok(())
    }
}

/// DNS provider configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// Cloudflare provider
    Cloudflare {
        /// Cloudflare API token
        api_token: String,
        /// Perform reads but skip writes
        #[serde(default)]
        dry_run: bool,
    },
}

impl ProviderConfig {
    /// Validate the provider configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            ProviderConfig::Cloudflare { api_token, .. } => {
                if api_token.is_empty() {
                    return Err(crate::Error::config("Cloudflare API token cannot be empty"));
                }
                Ok(())
            }
        }
    }

    /// Get the provider type name
    pub fn type_name(&self) -> &'static str {
        match self {
            ProviderConfig::Cloudflare { .. } => "cloudflare",
        }
    }
}

// Keeps the token out of logs
impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderConfig::Cloudflare { dry_run, .. } => f
                .debug_struct("Cloudflare")
                .field("api_token", &"<REDACTED>")
                .field("dry_run", dry_run)
                .finish(),
        }
    }
}

/// IP source configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IpSourceConfig {
    /// Only consider this interface (e.g., "eth0")
    #[serde(default)]
    pub interface: Option<String>,
}

impl IpSourceConfig {
    /// Validate the IP source configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if let Some(interface) = &self.interface
            && interface.trim().is_empty()
        {
            return Err(crate::Error::config("IP source interface cannot be empty"));
        }
        Ok(())
    }
}

/// Longest accepted reconcile interval (one day)
pub const MAX_INTERVAL_SECS: u64 = 86_400;

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Seconds between reconciliation passes; also the delay before the first
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// TTL written on created and updated records (in seconds)
    #[serde(default = "default_record_ttl")]
    pub record_ttl: u32,

    /// Capacity of the engine event channel
    ///
    /// When full, new events are dropped (with a warning log).
    ///
    /// Default: 100 events
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

impl EngineConfig {
    /// Validate the engine configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.interval_secs == 0 {
            return Err(crate::Error::config("Reconcile interval must be > 0"));
        }
        if self.interval_secs > MAX_INTERVAL_SECS {
            return Err(crate::Error::config(format!(
                "Reconcile interval must be at most {} seconds, got {}",
                MAX_INTERVAL_SECS, self.interval_secs
            )));
        }
        if self.record_ttl < 60 {
            return Err(crate::Error::config(format!(
                "Record TTL must be at least 60 seconds, got {}",
                self.record_ttl
            )));
        }
        if self.event_channel_capacity == 0 {
            return Err(crate::Error::config("Event channel capacity must be > 0"));
        }
        Ok(())
    }

    /// Reconcile interval as a [`Duration`]
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            record_ttl: default_record_ttl(),
            event_channel_capacity: default_event_channel_capacity(),
        }
    }
}

fn default_interval_secs() -> u64 {
    10
}

fn default_record_ttl() -> u32 {
    crate::traits::DEFAULT_RECORD_TTL
}

fn default_event_channel_capacity() -> usize {
    100
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cloudflare(token: &str) -> ProviderConfig {
        ProviderConfig::Cloudflare {
            api_token: token.to_string(),
            dry_run: false,
        }
    }

    #[test]
    fn test_defaults() {
        let engine = EngineConfig::default();
        assert_eq!(engine.interval(), Duration::from_secs(10));
        assert_eq!(engine.record_ttl, 600);

        let config = HostDnsConfig::new("example.com", cloudflare("token"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_failures() {
        let mut config = HostDnsConfig::new("", cloudflare("token"));
        assert!(config.validate().is_err());

        config.home_domain = "example.com".to_string();
        config.provider = cloudflare("");
        assert!(config.validate().is_err());

        config.provider = cloudflare("token");
        config.engine.interval_secs = 0;
        assert!(config.validate().is_err());

        config.engine.interval_secs = MAX_INTERVAL_SECS;
        assert!(config.validate().is_ok());
        config.engine.interval_secs = u64::MAX;
        assert!(matches!(config.validate(), Err(crate::Error::Config(_))));

        config.engine = EngineConfig {
            record_ttl: 30,
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());

        config.engine = EngineConfig::default();
        config.ip_source.interface = Some(String::new());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: HostDnsConfig = serde_json::from_str(
            r#"{"home_domain":"example.com","provider":{"type":"cloudflare","api_token":"t"}}"#,
        )
        .unwrap();

        assert_eq!(config.provider.type_name(), "cloudflare");
        assert_eq!(config.engine.interval_secs, 10);
        assert!(config.ip_source.interface.is_none());
    }

    #[test]
    fn test_token_not_exposed_in_debug() {
        let debug_str = format!("{:?}", cloudflare("secret_token_12345"));
        assert!(!debug_str.contains("secret_token"));
        assert!(debug_str.contains("REDACTED"));
    }
}
