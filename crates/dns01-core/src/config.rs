//! Configuration types for the DNS-01 solver
//!
//! The solver configuration travels inside each challenge request as an
//! untyped JSON blob and is decoded into [`SolverConfig`] per operation.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// TTL, in seconds, of every challenge record the solver creates.
///
/// Fixed policy: callers cannot override it per request.
pub const CHALLENGE_TTL: u32 = 60;

/// Reference to one field of a secret in the request's namespace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretKeySelector {
    /// Secret name
    pub name: String,

    /// Field key within the secret
    pub key: String,
}

impl SecretKeySelector {
    /// Create a new selector
    pub fn new(name: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key: key.into(),
        }
    }

    /// Validate the selector
    pub fn validate(&self, field: &str) -> Result<()> {
        if self.name.is_empty() {
            return Err(Error::config_decode(format!("{field}.name cannot be empty")));
        }
        if self.key.is_empty() {
            return Err(Error::config_decode(format!("{field}.key cannot be empty")));
        }
        Ok(())
    }
}

/// Solver configuration embedded in `ChallengeRequest.config`
///
/// ```json
/// {
///   "apiKeySecretRef": { "name": "porkbun", "key": "api-key" },
///   "secretKeySecretRef": { "name": "porkbun", "key": "secret-key" }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolverConfig {
    /// Where to find the provider API key
    pub api_key_secret_ref: SecretKeySelector,

    /// Where to find the provider secret key
    pub secret_key_secret_ref: SecretKeySelector,
}

impl SolverConfig {
    /// Decode the configuration blob of a challenge request
    ///
    /// A missing blob is a decode failure: both secret references are required.
    pub fn from_request_config(config: Option<&serde_json::Value>) -> Result<Self> {
        let value = match config {
            Some(value) if !value.is_null() => value,
            _ => return Err(Error::config_decode("no solver config in challenge request")),
        };

        let config: SolverConfig = serde_json::from_value(value.clone())
            .map_err(|e| Error::config_decode(e.to_string()))?;
        config.validate()?;

        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.api_key_secret_ref.validate("apiKeySecretRef")?;
        self.secret_key_secret_ref.validate("secretKeySecretRef")?;
        Ok(())
    }
}
