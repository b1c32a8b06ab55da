//! Challenge requests handed to the solver
//!
//! A [`ChallengeRequest`] is immutable and scoped to a single Present or
//! CleanUp call. Record names are derived from it on demand:
//!
//! | FQDN | Zone | domain | entity | absolute name |
//! |------|------|--------|--------|---------------|
//! | `_acme-challenge.example.com.` | `example.com.` | `example.com` | `_acme-challenge` | `_acme-challenge.example.com` |

use serde::{Deserialize, Serialize};

/// Record type of every challenge record
pub const TXT: &str = "TXT";

/// A request to publish or remove one DNS-01 challenge record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeRequest {
    /// Request identifier assigned by the webhook framework
    #[serde(default)]
    pub uid: String,

    /// Framework action ("Present" or "CleanUp"); informational only
    #[serde(default)]
    pub action: String,

    /// Challenge type; always "dns-01" for this solver
    #[serde(default, rename = "type")]
    pub challenge_type: String,

    /// Name being validated, as given in the certificate
    #[serde(default)]
    pub dns_name: String,

    /// Expected TXT record content (the authorization token)
    pub key: String,

    /// Namespace that credential lookups are scoped to
    pub resource_namespace: String,

    /// Fully-qualified record name, with trailing dot
    #[serde(rename = "resolvedFQDN")]
    pub resolved_fqdn: String,

    /// Zone managed at the provider, with trailing dot
    pub resolved_zone: String,

    /// Whether ambient credentials may be used; this solver never does
    #[serde(default)]
    pub allow_ambient_credentials: bool,

    /// Opaque solver configuration, decoded into `SolverConfig`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<serde_json::Value>,
}

impl ChallengeRequest {
    /// Create a request with the fields the solver acts on
    pub fn new(
        resolved_fqdn: impl Into<String>,
        resolved_zone: impl Into<String>,
        key: impl Into<String>,
        resource_namespace: impl Into<String>,
    ) -> Self {
        Self {
            resolved_fqdn: resolved_fqdn.into(),
            resolved_zone: resolved_zone.into(),
            key: key.into(),
            resource_namespace: resource_namespace.into(),
            challenge_type: "dns-01".to_string(),
            ..Self::default()
        }
    }

    /// Attach the solver configuration blob
    pub fn with_config(mut self, config: serde_json::Value) -> Self {
        self.config = Some(config);
        self
    }

    /// Domain the provider manages: zone without trailing dot
    pub fn domain(&self) -> &str {
        trim_root(&self.resolved_zone)
    }

    /// Record name relative to the zone, as sent on create
    ///
    /// The zone apex maps to the empty name.
    pub fn entity(&self) -> &str {
        if self.resolved_fqdn == self.resolved_zone {
            return "";
        }
        self.resolved_fqdn
            .strip_suffix(&self.resolved_zone)
            .and_then(|rest| rest.strip_suffix('.'))
            .unwrap_or(&self.resolved_fqdn)
    }

    /// Absolute record name as the provider reports it in listings
    pub fn absolute_name(&self) -> &str {
        trim_root(&self.resolved_fqdn)
    }
}

fn trim_root(name: &str) -> &str {
    name.strip_suffix('.').unwrap_or(name)
}
