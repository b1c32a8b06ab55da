// # Porkbun Record Client
//
// This crate adapts the Porkbun DNS API to the `RecordClient` seam of the
// DNS-01 challenge solver.
//
// ## Scope
//
// - Makes exactly one HTTP request per `RecordClient` call
// - Full error propagation (the webhook framework owns retries and backoff)
// - HTTP timeout configured (30 seconds)
// - NO retry logic, NO caching, NO background tasks
//
// ## Security Requirements
//
// - API key and secret key NEVER appear in logs or error messages
// - Credentials travel in the JSON request body only, never in URLs
// - Client creation fails fast if either credential is empty
//
// ## API Reference
//
// - Porkbun API v3: https://porkbun.com/api/json/v3/documentation
// - List records:  POST `/dns/retrieve/:domain`
// - Create record: POST `/dns/create/:domain`
// - Delete record: POST `/dns/delete/:domain/:id`
//
// Every request carries `{"apikey": ..., "secretapikey": ...}` and every
// response carries `"status": "SUCCESS"` or `"status": "ERROR"` with a message.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dns01_core::credentials::ProviderCredentials;
use dns01_core::traits::{DnsRecord, NewRecord, RecordClient, RecordClientFactory, RecordId};
use dns01_core::{Error, Reconciler, Result, SolverRegistry};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Porkbun API base URL
pub const PORKBUN_API_BASE: &str = "https://api.porkbun.com/api/json/v3";

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

const PROVIDER: &str = "porkbun";
const STATUS_SUCCESS: &str = "SUCCESS";

/// Porkbun record client
///
/// Built per operation from freshly resolved credentials; holds no record
/// state between calls.
///
/// # Security
///
/// The Debug implementation intentionally does NOT expose the credentials.
pub struct PorkbunClient {
    /// API key and secret key
    /// ⚠️ NEVER log these values
    credentials: ProviderCredentials,

    /// API base URL without trailing slash
    base_url: String,

    /// HTTP client for API requests
    client: reqwest::Client,
}

impl fmt::Debug for PorkbunClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PorkbunClient")
            .field("credentials", &"<REDACTED>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl PorkbunClient {
    /// Create a new Porkbun client
    ///
    /// # Parameters
    ///
    /// - `credentials`: API key and secret key with API access enabled on the domain
    /// - `base_url`: API base URL, normally [`PORKBUN_API_BASE`]
    ///
    /// # Returns
    ///
    /// - `Err(Error::Config)`: A credential is empty
    /// - `Err(Error::Provider)`: The HTTP client could not be built
    pub fn new(credentials: ProviderCredentials, base_url: impl Into<String>) -> Result<Self> {
        if credentials.api_key.expose().is_empty() {
            return Err(Error::config("Porkbun API key cannot be empty"));
        }
        if credentials.secret_key.expose().is_empty() {
            return Err(Error::config("Porkbun secret key cannot be empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::provider(PROVIDER, format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            credentials,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    /// POST an authenticated request and decode a SUCCESS envelope
    async fn call<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .post(&url)
            .json(&Authenticated {
                apikey: self.credentials.api_key.expose(),
                secretapikey: self.credentials.secret_key.expose(),
                body,
            })
            .send()
            .await
            .map_err(|e| Error::provider(PROVIDER, format!("HTTP request failed: {}", e.without_url())))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read response".to_string());

        // Porkbun reports most failures as an ERROR envelope, often with HTTP 400
        let envelope: Envelope<T> = match serde_json::from_str(&text) {
            Ok(envelope) => envelope,
            Err(_) if !status.is_success() => return Err(status_error(status, &text)),
            Err(e) => {
                return Err(Error::provider(PROVIDER, format!("Failed to parse response: {e}")));
            }
        };

        if envelope.status != STATUS_SUCCESS {
            let message = envelope.message.unwrap_or_else(|| format!("HTTP {status}"));
            return Err(Error::provider(PROVIDER, format!("API error: {message}")));
        }

        if !status.is_success() {
            return Err(status_error(status, &text));
        }

        Ok(envelope.body)
    }
}

#[async_trait]
impl RecordClient for PorkbunClient {
    /// List every record of a domain
    ///
    /// ```http
    /// POST /dns/retrieve/example.com
    /// {"apikey": "...", "secretapikey": "..."}
    /// ```
    async fn list_records(&self, domain: &str) -> Result<Vec<DnsRecord>> {
        tracing::debug!(domain = %domain, "Retrieving Porkbun records");

        let listing: Listing = self.call(&format!("/dns/retrieve/{domain}"), &NoBody {}).await?;

        tracing::debug!(domain = %domain, count = listing.records.len(), "Retrieved Porkbun records");
        Ok(listing.records.into_iter().map(DnsRecord::from).collect())
    }

    /// Create a record
    ///
    /// ```http
    /// POST /dns/create/example.com
    /// {"apikey": "...", "secretapikey": "...", "name": "_acme-challenge",
    ///  "type": "TXT", "content": "...", "ttl": "60"}
    /// ```
    async fn create_record(&self, domain: &str, record: &NewRecord) -> Result<RecordId> {
        tracing::debug!(domain = %domain, name = %record.name, record_type = %record.record_type, "Creating Porkbun record");

        let created: Created = self
            .call(
                &format!("/dns/create/{domain}"),
                &CreateBody {
                    name: &record.name,
                    record_type: &record.record_type,
                    content: &record.content,
                    ttl: record.ttl.to_string(),
                },
            )
            .await?;

        match created.id {
            Some(RawId::Number(id)) => Ok(id),
            Some(RawId::Text(id)) => id
                .parse()
                .map_err(|_| Error::provider(PROVIDER, format!("Create returned a non-numeric id: {id:?}"))),
            None => Err(Error::provider(PROVIDER, "Create response has no record id")),
        }
    }

    /// Delete a record by id
    ///
    /// ```http
    /// POST /dns/delete/example.com/253024946
    /// {"apikey": "...", "secretapikey": "..."}
    /// ```
    async fn delete_record(&self, domain: &str, id: RecordId) -> Result<()> {
        tracing::debug!(domain = %domain, record_id = id, "Deleting Porkbun record");

        let _: NoBody = self.call(&format!("/dns/delete/{domain}/{id}"), &NoBody {}).await?;
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}

/// Factory for creating Porkbun clients
#[derive(Debug, Clone)]
pub struct PorkbunFactory {
    base_url: String,
}

impl PorkbunFactory {
    /// Factory targeting the public Porkbun API
    pub fn new() -> Self {
        Self::with_base_url(PORKBUN_API_BASE)
    }

    /// Factory targeting another API endpoint (e.g. a test server)
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    /// API base URL clients are built against
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Default for PorkbunFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordClientFactory for PorkbunFactory {
    fn create(&self, credentials: ProviderCredentials) -> Result<Box<dyn RecordClient>> {
        Ok(Box::new(PorkbunClient::new(credentials, self.base_url.clone())?))
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}

/// Register the Porkbun solver with a registry
///
/// This function should be called during initialization, before the
/// registry's solvers are initialized with a secret store.
///
/// # Example
///
/// ```rust,ignore
/// use dns01_core::SolverRegistry;
/// use dns01_provider_porkbun::PorkbunFactory;
///
/// let registry = SolverRegistry::new("acme.example.com");
/// dns01_provider_porkbun::register(&registry, PorkbunFactory::new())?;
/// ```
pub fn register(registry: &SolverRegistry, factory: PorkbunFactory) -> Result<()> {
    registry.register(Arc::new(Reconciler::new(Arc::new(factory))))
}

#[derive(Serialize)]
struct Authenticated<'a, B> {
    apikey: &'a str,
    secretapikey: &'a str,
    #[serde(flatten)]
    body: &'a B,
}

#[derive(Serialize, Deserialize)]
struct NoBody {}

#[derive(Serialize)]
struct CreateBody<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    record_type: &'a str,
    content: &'a str,
    ttl: String,
}

#[derive(Deserialize)]
struct Envelope<T> {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(flatten)]
    body: T,
}

#[derive(Deserialize)]
struct Listing {
    #[serde(default)]
    records: Vec<PorkbunRecord>,
}

#[derive(Deserialize)]
struct Created {
    #[serde(default)]
    id: Option<RawId>,
}

/// Record ids come back as strings in listings and as numbers on create
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Number(u64),
    Text(String),
}

impl From<RawId> for String {
    fn from(id: RawId) -> Self {
        match id {
            RawId::Number(n) => n.to_string(),
            RawId::Text(s) => s,
        }
    }
}

#[derive(Deserialize)]
struct PorkbunRecord {
    id: RawId,
    name: String,
    #[serde(rename = "type")]
    record_type: String,
    content: String,
    #[serde(default)]
    ttl: Option<RawId>,
}

impl From<PorkbunRecord> for DnsRecord {
    fn from(record: PorkbunRecord) -> Self {
        DnsRecord {
            id: record.id.into(),
            record_type: record.record_type,
            name: record.name,
            content: record.content,
            ttl: record.ttl.map(String::from),
        }
    }
}

/// Map a non-JSON failure response to a provider error
fn status_error(status: reqwest::StatusCode, body: &str) -> Error {
    let message = match status.as_u16() {
        401 | 403 => format!("Authentication failed: invalid API key or API access disabled. Status: {status}"),
        404 => format!("Endpoint not found. Status: {status}"),
        429 => format!("Rate limit exceeded. Please retry later. Status: {status}"),
        500..=599 => format!("Porkbun server error (transient): {status} - {}", truncate(body)),
        _ => format!("Request failed: {status} - {}", truncate(body)),
    };
    Error::provider(PROVIDER, message)
}

fn truncate(body: &str) -> &str {
    match body.char_indices().nth(200) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}
