// # Record Client Trait
//
// Defines the seam over a DNS provider's TXT record CRUD operations.
//
// ## Implementations
//
// - Porkbun: `dns01-provider-porkbun` crate
//
// ## Usage
//
// ```rust,ignore
// use dns01_core::{NewRecord, RecordClient};
//
// let records = client.list_records("example.com").await?;
// let id = client
//     .create_record("example.com", &NewRecord::txt("_acme-challenge", "abc123"))
//     .await?;
// client.delete_record("example.com", id).await?;
// ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::challenge::TXT;
use crate::config::CHALLENGE_TTL;
use crate::credentials::ProviderCredentials;

/// Provider-assigned record identifier
pub type RecordId = u64;

/// A record as observed in a provider listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsRecord {
    /// Opaque identifier, a decimal string for well-behaved providers
    pub id: String,

    /// Record type (e.g. "TXT")
    #[serde(rename = "type")]
    pub record_type: String,

    /// Absolute record name, without trailing dot
    pub name: String,

    /// Record value
    pub content: String,

    /// TTL as reported by the provider
    #[serde(default)]
    pub ttl: Option<String>,
}

impl DnsRecord {
    /// Whether this record is the challenge record for `absolute_name`/`key`
    pub fn matches_challenge(&self, absolute_name: &str, key: &str) -> bool {
        self.record_type == TXT && self.name == absolute_name && self.content == key
    }
}

/// A record to be created
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecord {
    /// Record name relative to the zone
    pub name: String,
    /// Record type
    pub record_type: String,
    /// Record value
    pub content: String,
    /// TTL in seconds
    pub ttl: u32,
}

impl NewRecord {
    /// A challenge TXT record carrying the fixed challenge TTL
    pub fn txt(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            record_type: TXT.to_string(),
            content: content.into(),
            ttl: CHALLENGE_TTL,
        }
    }
}

/// Trait for DNS provider record clients
///
/// A client is built per operation from freshly resolved credentials and
/// dropped when the operation ends.
///
/// Implementations must:
/// - Perform exactly one API call per method invocation
/// - Return errors instead of retrying; the webhook framework owns retry policy
/// - Never log or display the credentials they were built from
/// - Never cache records between calls
#[async_trait]
pub trait RecordClient: Send + Sync {
    /// List every record of a domain, in provider order
    ///
    /// # Parameters
    ///
    /// - `domain`: The managed domain, without trailing dot (e.g. "example.com")
    async fn list_records(&self, domain: &str) -> Result<Vec<DnsRecord>, crate::Error>;

    /// Create a record and return its identifier
    ///
    /// # Parameters
    ///
    /// - `domain`: The managed domain
    /// - `record`: The record to create; its name is relative to `domain`
    async fn create_record(&self, domain: &str, record: &NewRecord) -> Result<RecordId, crate::Error>;

    /// Delete a record by identifier
    async fn delete_record(&self, domain: &str, id: RecordId) -> Result<(), crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}

/// Helper trait for constructing record clients from resolved credentials
pub trait RecordClientFactory: Send + Sync {
    /// Create a RecordClient instance
    ///
    /// # Parameters
    ///
    /// - `credentials`: Credentials resolved for the current operation
    fn create(&self, credentials: ProviderCredentials) -> Result<Box<dyn RecordClient>, crate::Error>;

    /// Name of the provider this factory builds clients for
    ///
    /// Also used as the solver name.
    fn provider_name(&self) -> &'static str;
}
