//! Error types for the hostdns system
//!
//! This module defines all error types used throughout the workspace. The
//! first five variants are the reconciliation error kinds; the remaining ones
//! are raised by collaborators (provider clients, IP sources, configuration)
//! and usually end up wrapped by one of the reconciliation kinds.

use std::fmt;
use thiserror::Error;

/// Result type alias for hostdns operations
pub type Result<T> = std::result::Result<T, Error>;

/// Provider call attempted by the record reconciler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderOperation {
    /// Listing records for the target name
    List,
    /// Creating a missing record
    Create,
    /// Updating a stale record
    Update,
}

impl fmt::Display for ProviderOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProviderOperation::List => "list",
            ProviderOperation::Create => "create",
            ProviderOperation::Update => "update",
        };
        f.write_str(name)
    }
}

/// Core error type for the hostdns system
#[derive(Error, Debug)]
pub enum Error {
    /// No interface carries a usable IPv4 address
    #[error("no usable IPv4 address found: {0}")]
    NoAddressFound(String),

    /// Home domain has fewer than two labels
    #[error("invalid domain '{0}': need at least two labels")]
    InvalidDomain(String),

    /// Provider zone lookup failed
    #[error("failed to look up zone '{zone}': {source}")]
    ZoneLookupFailed {
        /// The naked domain that was looked up
        zone: String,
        /// Underlying provider error
        #[source]
        source: Box<Error>,
    },

    /// A list/create/update call to the provider failed
    #[error("failed to {operation} records: {source}")]
    ProviderOperationFailed {
        /// Which call failed
        operation: ProviderOperation,
        /// Underlying provider error
        #[source]
        source: Box<Error>,
    },

    /// OS hostname could not be read
    #[error("failed to get hostname: {0}")]
    HostnameUnavailable(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP transport errors (from provider APIs)
    #[error("HTTP error: {0}")]
    Http(String),

    /// Authentication errors
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Rate limiting errors
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Resource not found at the provider
    #[error("Not found: {0}")]
    NotFound(String),

    /// Provider-specific error
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },

    /// OS-level I/O errors (interface enumeration)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a "no address found" error
    pub fn no_address(msg: impl Into<String>) -> Self {
        Self::NoAddressFound(msg.into())
    }

    /// Create an invalid domain error
    pub fn invalid_domain(domain: impl Into<String>) -> Self {
        Self::InvalidDomain(domain.into())
    }

    /// Wrap a provider error raised during zone lookup
    pub fn zone_lookup(zone: impl Into<String>, source: Error) -> Self {
        Self::ZoneLookupFailed {
            zone: zone.into(),
            source: Box::new(source),
        }
    }

    /// Wrap a provider error raised during a record operation
    pub fn provider_operation(operation: ProviderOperation, source: Error) -> Self {
        Self::ProviderOperationFailed {
            operation,
            source: Box::new(source),
        }
    }

    /// Create a hostname error
    pub fn hostname(msg: impl Into<String>) -> Self {
        Self::HostnameUnavailable(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create a rate limit error
    pub fn rate_limited(msg: impl Into<String>) -> Self {
        Self::RateLimited(msg.into())
    }

    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// The provider operation this error was raised by, if any
    pub fn operation(&self) -> Option<ProviderOperation> {
        match self {
            Self::ProviderOperationFailed { operation, .. } => Some(*operation),
            _ => None,
        }
    }
}
