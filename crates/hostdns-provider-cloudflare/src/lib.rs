// # Cloudflare DNS Provider
//
// This crate provides the Cloudflare API v4 implementation of
// `hostdns_core::DnsProvider`.
//
// ## Behavior
//
// - One HTTP request per trait call; no retry, backoff, or caching
// - Errors are mapped by HTTP status (401/403, 404, 409, 429, 5xx) and
//   returned unchanged to the reconciler
// - HTTP timeout of 30 seconds is the only timeout in a pass
// - Dry-run mode performs reads and logs the writes it would have made
//
// ## Security Requirements
//
// - API token NEVER appears in logs or `Debug` output
// - Provider construction fails if the token is empty
//
// ## API Reference
//
// - Cloudflare API v4: https://developers.cloudflare.com/api/
// - List Zones: GET `/zones?name=...`
// - List DNS Records: GET `/zones/:zone_id/dns_records?name=...`
// - Create DNS Record: POST `/zones/:zone_id/dns_records`
// - Update DNS Record: PUT `/zones/:zone_id/dns_records/:record_id`

use async_trait::async_trait;
use hostdns_core::config::ProviderConfig;
use hostdns_core::traits::{DnsProvider, DnsRecord, RecordFilter};
use hostdns_core::{Error, Result};
use reqwest::StatusCode;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Cloudflare API base URL
pub const CLOUDFLARE_API_BASE: &str = "https://api.cloudflare.com/client/v4";

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Response envelope shared by every Cloudflare v4 endpoint
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    success: bool,
    #[serde(default)]
    errors: Vec<ApiMessage>,
    result: Option<T>,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct ZoneResult {
    id: String,
}

/// Cloudflare DNS provider
///
/// # Dry-Run Mode
///
/// When `dry_run` is true, the provider will:
/// - Perform all GET requests (zone lookup, record listing)
/// - Log the intended POST/PUT payload
/// - **NOT** actually create or modify DNS records
pub struct CloudflareProvider {
    /// Cloudflare API token
    /// ⚠️ NEVER log this value
    api_token: String,

    /// API base URL (overridable for tests)
    base_url: String,

    /// HTTP client for API requests
    client: reqwest::Client,

    /// Dry-run mode: if true, perform reads but skip writes
    dry_run: bool,
}

// Custom Debug implementation that hides the API token
impl std::fmt::Debug for CloudflareProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudflareProvider")
            .field("api_token", &"<REDACTED>")
            .field("base_url", &self.base_url)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl CloudflareProvider {
    /// Create a new Cloudflare provider
    ///
    /// # Parameters
    ///
    /// - `api_token`: Cloudflare API token with Zone:Read and DNS:Edit permissions
    /// - `dry_run`: If true, perform reads but skip writes
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if the token is empty
    /// - [`Error::Http`] if the HTTP client cannot be built
    pub fn new(api_token: impl Into<String>, dry_run: bool) -> Result<Self> {
        let api_token = api_token.into();
        if api_token.is_empty() {
            return Err(Error::config("Cloudflare API token cannot be empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_token,
            base_url: CLOUDFLARE_API_BASE.to_string(),
            client,
            dry_run,
        })
    }

    /// Create a provider from configuration
    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        match config {
            ProviderConfig::Cloudflare { api_token, dry_run } => {
                if *dry_run {
                    tracing::warn!("Cloudflare provider running in DRY-RUN mode - no changes will be made");
                }
                Self::new(api_token.clone(), *dry_run)
            }
        }
    }

    /// Point the provider at a different API root
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Whether writes are skipped
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Send an authenticated request and unwrap the response envelope
    ///
    /// `context` names the call in error messages.
    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        context: &str,
    ) -> Result<Option<T>> {
        let response = request
            .bearer_auth(&self.api_token)
            .send()
            .await
            .map_err(|e| Error::http(format!("{}: request failed: {}", context, e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(status_error(status, context, &error_text));
        }

        let envelope: ApiResponse<T> = response.json().await.map_err(|e| {
            Error::provider("cloudflare", format!("{}: failed to parse response: {}", context, e))
        })?;

        if !envelope.success {
            let messages: Vec<String> = envelope
                .errors
                .iter()
                .map(|m| format!("{} (code {})", m.message, m.code))
                .collect();
            return Err(Error::provider(
                "cloudflare",
                format!("{}: {}", context, messages.join("; ")),
            ));
        }

        Ok(envelope.result)
    }

    fn records_url(&self, zone_id: &str) -> String {
        format!("{}/zones/{}/dns_records", self.base_url, zone_id)
    }
}

/// Map a non-success HTTP status to an error
fn status_error(status: StatusCode, context: &str, error_text: &str) -> Error {
    match status.as_u16() {
        401 | 403 => Error::auth(format!(
            "{}: invalid API token or insufficient permissions. Status: {}",
            context, status
        )),
        404 => Error::not_found(format!("{}: {}", context, status)),
        409 => Error::provider(
            "cloudflare",
            format!("{}: conflict with an existing record. Status: {}", context, status),
        ),
        429 => Error::rate_limited(format!("{}: rate limit exceeded. Status: {}", context, status)),
        500..=599 => Error::provider(
            "cloudflare",
            format!("{}: Cloudflare server error (transient): {} - {}", context, status, error_text),
        ),
        _ => Error::provider(
            "cloudflare",
            format!("{}: {} - {}", context, status, error_text),
        ),
    }
}

fn missing_result(context: &str) -> Error {
    Error::provider("cloudflare", format!("{}: response has no result", context))
}

#[async_trait]
impl DnsProvider for CloudflareProvider {
    /// ```http
    /// GET /zones?name=example.com
    /// ```
    async fn zone_id_by_name(&self, zone_name: &str) -> Result<String> {
        tracing::debug!("Looking up Cloudflare zone: {}", zone_name);

        let request = self
            .client
            .get(format!("{}/zones", self.base_url))
            .query(&[("name", zone_name)]);

        let zones: Vec<ZoneResult> = self
            .send(request, "zone lookup")
            .await?
            .ok_or_else(|| missing_result("zone lookup"))?;

        let zone = zones
            .into_iter()
            .next()
            .ok_or_else(|| Error::not_found(format!("Zone not found: {}", zone_name)))?;

        tracing::debug!("Found zone ID: {}", zone.id);
        Ok(zone.id)
    }

    /// ```http
    /// GET /zones/:zone_id/dns_records?name=box.example.com
    /// ```
    async fn list_records(&self, zone_id: &str, filter: &RecordFilter) -> Result<Vec<DnsRecord>> {
        let mut request = self.client.get(self.records_url(zone_id));
        if let Some(name) = &filter.name {
            request = request.query(&[("name", name.as_str())]);
        }

        let records: Vec<DnsRecord> = self
            .send(request, "record lookup")
            .await?
            .ok_or_else(|| missing_result("record lookup"))?;

        tracing::debug!("Found {} record(s) for {:?}", records.len(), filter.name);
        Ok(records)
    }

    /// ```http
    /// POST /zones/:zone_id/dns_records
    /// { "type": "A", "name": "...", "content": "1.2.3.4", "ttl": 600 }
    /// ```
    async fn create_record(&self, zone_id: &str, record: &DnsRecord) -> Result<DnsRecord> {
        if self.dry_run {
            tracing::info!(
                "[DRY-RUN] Would POST {} with payload: {}",
                self.records_url(zone_id),
                serde_json::to_string(record)?
            );
            return Ok(record.clone());
        }

        let request = self.client.post(self.records_url(zone_id)).json(record);
        let created: DnsRecord = self
            .send(request, "record create")
            .await?
            .ok_or_else(|| missing_result("record create"))?;

        tracing::info!("DNS record created: {} -> {}", created.name, created.content);
        Ok(created)
    }

    /// ```http
    /// PUT /zones/:zone_id/dns_records/:record_id
    /// { "type": "A", "name": "...", "content": "1.2.3.4", "ttl": 600 }
    /// ```
    async fn update_record(&self, zone_id: &str, record_id: &str, record: &DnsRecord) -> Result<()> {
        let url = format!("{}/{}", self.records_url(zone_id), record_id);

        if self.dry_run {
            tracing::info!(
                "[DRY-RUN] Would PUT {} with payload: {}",
                url,
                serde_json::to_string(record)?
            );
            return Ok(());
        }

        let request = self.client.put(&url).json(record);
        let _: Option<serde_json::Value> = self.send(request, "record update").await?;

        tracing::info!("DNS record updated: {} -> {}", record.name, record.content);
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "cloudflare"
    }
}
