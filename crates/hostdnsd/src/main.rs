// # hostdnsd - hostdns Daemon
//
// This is a THIN integration layer: all reconciliation logic lives in
// hostdns-core. The daemon is responsible for:
// 1. Reading configuration from environment variables
// 2. Initializing logging and the runtime
// 3. Building the IP source, provider, and engine
// 4. Running the engine until SIGINT/SIGTERM or the first failed pass
//
// ## Configuration
//
// All configuration is done via environment variables:
//
// ### Required
// - `HOSTDNS_PROVIDER_API_TOKEN`: Cloudflare API token
// - `HOSTDNS_HOME_DOMAIN`: Domain the host is published under (e.g., example.com)
//
// ### Optional
// - `HOSTDNS_HOSTNAME`: Hostname override (default: OS hostname)
// - `HOSTDNS_IP_INTERFACE`: Only take the address from this interface
// - `HOSTDNS_INTERVAL_SECS`: Seconds between passes (default: 10)
// - `HOSTDNS_MODE`: Set to `dry-run` to skip writes
// - `HOSTDNS_LOG_LEVEL`: trace, debug, info, warn, error (default: info)
//
// ## Example
//
// ```bash
// export HOSTDNS_PROVIDER_API_TOKEN=your_token
// export HOSTDNS_HOME_DOMAIN=example.com
//
// hostdnsd
// ```

use anyhow::{Context, Result};
use hostdns_core::{HostDnsConfig, HostDnsEngine, HostIdentity, IpSourceConfig, ProviderConfig};
use hostdns_ip_iface::InterfaceIpSource;
use hostdns_provider_cloudflare::CloudflareProvider;
use std::env;
use std::process::ExitCode;
use tracing::{Level, debug, error, info};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (a reconciliation pass failed)
#[derive(Debug, Clone, Copy)]
enum HostDnsExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (reconciliation failed)
    RuntimeError = 2,
}

impl From<HostDnsExitCode> for ExitCode {
    fn from(code: HostDnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Application configuration
///
/// No `Debug` derive: the struct holds the API token.
struct Config {
    provider_api_token: String,
    home_domain: String,
    hostname: Option<String>,
    ip_interface: Option<String>,
    interval_secs: Option<u64>,
    dry_run: bool,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through a variable lookup function
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let interval_secs = match non_empty("HOSTDNS_INTERVAL_SECS") {
            Some(raw) => Some(raw.parse::<u64>().with_context(|| {
                format!("HOSTDNS_INTERVAL_SECS must be a number of seconds. Got: {}", raw)
            })?),
            None => None,
        };

        let dry_run = match non_empty("HOSTDNS_MODE").as_deref() {
            None | Some("live") => false,
            Some("dry-run") => true,
            Some(other) => anyhow::bail!(
                "HOSTDNS_MODE '{}' is not valid. Valid modes: live, dry-run",
                other
            ),
        };

        Ok(Self {
            provider_api_token: lookup("HOSTDNS_PROVIDER_API_TOKEN")
                .context("HOSTDNS_PROVIDER_API_TOKEN is not set")?,
            home_domain: lookup("HOSTDNS_HOME_DOMAIN").context("HOSTDNS_HOME_DOMAIN is not set")?,
            hostname: non_empty("HOSTDNS_HOSTNAME"),
            ip_interface: non_empty("HOSTDNS_IP_INTERFACE"),
            interval_secs,
            dry_run,
            log_level: non_empty("HOSTDNS_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }

    /// Validate the configuration
    ///
    /// Rejects placeholder tokens, malformed names, a one-label home domain
    /// and out-of-range numbers.
    fn validate(&self) -> Result<()> {
        if self.provider_api_token.is_empty() {
            anyhow::bail!(
                "HOSTDNS_PROVIDER_API_TOKEN is required. \
                Set it via: export HOSTDNS_PROVIDER_API_TOKEN=your_token"
            );
        }

        let token = self.provider_api_token.to_lowercase();
        if token == "token" || PLACEHOLDER_TOKENS.iter().any(|p| token.contains(p)) {
            anyhow::bail!("HOSTDNS_PROVIDER_API_TOKEN is still a placeholder value");
        }

        check_dns_name("HOSTDNS_HOME_DOMAIN", &self.home_domain)?;
        if let Some(hostname) = &self.hostname {
            check_dns_name("HOSTDNS_HOSTNAME", hostname)?;
        }
        hostdns_core::resolver::naked_domain(&self.home_domain)
            .context("HOSTDNS_HOME_DOMAIN must have at least two labels (e.g., example.com)")?;

        if let Some(interval) = self.interval_secs
            && !(1..=3600).contains(&interval)
        {
            anyhow::bail!(
                "HOSTDNS_INTERVAL_SECS must be between 1 and 3600 seconds. Got: {}",
                interval
            );
        }

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "HOSTDNS_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        Ok(())
    }

    /// Build the core configuration
    fn to_core(&self) -> HostDnsConfig {
        let mut config = HostDnsConfig::new(
            self.home_domain.clone(),
            ProviderConfig::Cloudflare {
                api_token: self.provider_api_token.clone(),
                dry_run: self.dry_run,
            },
        );
        config.hostname = self.hostname.clone();
        config.ip_source = IpSourceConfig {
            interface: self.ip_interface.clone(),
        };
        if let Some(interval_secs) = self.interval_secs {
            config.engine.interval_secs = interval_secs;
        }
        config
    }

    fn level(&self) -> Level {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }
}

/// Values copied from documentation instead of a real token
const PLACEHOLDER_TOKENS: &[&str] = &["your_token", "replace_me", "changeme"];

/// Longest name a DNS message can carry, without the root dot
const MAX_NAME_LEN: usize = 253;
const MAX_LABEL_LEN: usize = 63;

/// Check `name` as a dotted DNS name (LDH labels, one optional trailing dot)
fn check_dns_name(var: &str, name: &str) -> Result<()> {
    let name = name.strip_suffix('.').unwrap_or(name);
    if name.is_empty() || name.len() > MAX_NAME_LEN {
        anyhow::bail!("{} must be 1..={} characters. Got: '{}'", var, MAX_NAME_LEN, name);
    }

    if let Some((label, problem)) = name
        .split('.')
        .find_map(|label| label_problem(label).map(|problem| (label, problem)))
    {
        anyhow::bail!("{} label '{}' {}", var, label, problem);
    }

    Ok(())
}

fn label_problem(label: &str) -> Option<&'static str> {
    if label.is_empty() {
        Some("is empty")
    } else if label.len() > MAX_LABEL_LEN {
        Some("is longer than 63 characters")
    } else if !label.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-') {
        Some("may only contain letters, digits and '-'")
    } else if label.starts_with('-') || label.ends_with('-') {
        Some("may not start or end with '-'")
    } else {
        None
    }
}

fn main() -> ExitCode {
    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return HostDnsExitCode::ConfigError.into();
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {:#}", e);
        return HostDnsExitCode::ConfigError.into();
    }

    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.level())
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return HostDnsExitCode::ConfigError.into();
    }

    info!("Starting hostdnsd");

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return HostDnsExitCode::RuntimeError.into();
        }
    };

    rt.block_on(run_daemon(config.to_core())).into()
}

/// Build the engine and run it until shutdown or the first failed pass
async fn run_daemon(config: HostDnsConfig) -> HostDnsExitCode {
    let engine = match build_engine(&config) {
        Ok(engine) => engine,
        Err(e) => {
            error!("Startup failed: {:#}", e);
            return HostDnsExitCode::ConfigError;
        }
    };

    let shutdown = match shutdown_signal() {
        Ok(shutdown) => shutdown,
        Err(e) => {
            error!("Startup failed: {:#}", e);
            return HostDnsExitCode::ConfigError;
        }
    };

    match engine.run_until(shutdown).await {
        Ok(()) => {
            info!("Shutting down hostdnsd");
            HostDnsExitCode::CleanShutdown
        }
        Err(e) => {
            error!("failed to run reconciliation: {}", e);
            HostDnsExitCode::RuntimeError
        }
    }
}

/// Wire the IP source, provider, and identity into an engine
fn build_engine(config: &HostDnsConfig) -> Result<HostDnsEngine> {
    config.validate()?;

    let identity = match &config.hostname {
        Some(hostname) => HostIdentity::new(hostname, &config.home_domain)?,
        None => HostIdentity::from_system(&config.home_domain)?,
    };
    info!("Managing A record: {}", identity);

    let provider = CloudflareProvider::from_config(&config.provider)?;
    let ip_source = InterfaceIpSource::from_config(&config.ip_source);
    if let Some(interface) = ip_source.interface() {
        info!("Using addresses of interface {}", interface);
    }

    let (engine, mut events) = HostDnsEngine::new(
        Box::new(ip_source),
        Box::new(provider),
        identity,
        &config.engine,
    )?;

    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            debug!("Engine event: {:?}", event);
        }
    });

    Ok(engine)
}

/// Future that completes on SIGTERM or SIGINT
///
/// Handlers are installed before the engine starts so an early signal is
/// not lost.
#[cfg(unix)]
fn shutdown_signal() -> Result<impl std::future::Future<Output = ()> + Send> {
    let mut sigterm = signal(SignalKind::terminate()).context("Failed to setup SIGTERM handler")?;
    let mut sigint = signal(SignalKind::interrupt()).context("Failed to setup SIGINT handler")?;

    Ok(async move {
        let name = tokio::select! {
            _ = sigterm.recv() => "SIGTERM",
            _ = sigint.recv() => "SIGINT",
        };
        info!("Received shutdown signal: {}", name);
    })
}

/// Future that completes on CTRL-C
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
fn shutdown_signal() -> Result<impl std::future::Future<Output = ()> + Send> {
    Ok(async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to wait for CTRL-C: {}", e);
        }
        info!("Received shutdown signal: SIGINT");
    })
}
