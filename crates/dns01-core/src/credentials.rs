//! Credential resolution
//!
//! Provider credentials are never part of the solver configuration. The
//! configuration only names secret fields; [`CredentialResolver`] reads them
//! from the [`SecretStore`] in the namespace of the triggering request.

use std::fmt;

use tracing::debug;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::config::{SecretKeySelector, SolverConfig};
use crate::error::{Error, Result};
use crate::traits::SecretStore;

/// A plaintext credential, held only for the duration of one operation
///
/// # Security
///
/// The Debug implementation intentionally does NOT expose the value, and the
/// backing memory is zeroed when the credential is dropped.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Credential(String);

impl Credential {
    /// Wrap a plaintext credential
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Access the plaintext value
    ///
    /// ⚠️ NEVER log the returned value
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<REDACTED>)")
    }
}

/// The credential pair a provider client is built from
#[derive(Debug, Clone)]
pub struct ProviderCredentials {
    /// Provider API key
    pub api_key: Credential,
    /// Provider secret key
    pub secret_key: Credential,
}

/// Resolves secret references to plaintext credentials
pub struct CredentialResolver<'a> {
    store: &'a dyn SecretStore,
}

impl<'a> CredentialResolver<'a> {
    /// Create a resolver over a secret store
    pub fn new(store: &'a dyn SecretStore) -> Self {
        Self { store }
    }

    /// Resolve a single secret field
    ///
    /// # Parameters
    ///
    /// - `selector`: Secret name and field key
    /// - `namespace`: Namespace of the triggering request; lookups never fall
    ///   back to a default namespace
    ///
    /// # Returns
    ///
    /// - `Ok(Credential)`: The field value
    /// - `Err(Error::SecretLookup)`: The secret is missing, unreadable or not UTF-8
    /// - `Err(Error::SecretFieldMissing)`: The secret lacks the field
    pub async fn resolve(&self, selector: &SecretKeySelector, namespace: &str) -> Result<Credential> {
        debug!(namespace = %namespace, secret = %selector.name, key = %selector.key, "Resolving secret reference");

        let mut data = self
            .store
            .get_secret(namespace, &selector.name)
            .await
            .map_err(|e| match e {
                Error::SecretLookup { .. } => e,
                other => Error::secret_lookup(namespace, &selector.name, other.to_string()),
            })?;

        let bytes = data
            .remove(&selector.key)
            .ok_or_else(|| Error::secret_field_missing(namespace, &selector.name, &selector.key))?;

        // Zero the remaining fields; only the requested one leaves this function.
        for value in data.values_mut() {
            value.zeroize();
        }

        let value = String::from_utf8(bytes).map_err(|e| {
            let mut raw = e.into_bytes();
            raw.zeroize();
            Error::secret_lookup(
                namespace,
                &selector.name,
                format!("key {:?} is not valid UTF-8", selector.key),
            )
        })?;

        Ok(Credential::new(value))
    }

    /// Resolve both provider credentials named by a solver configuration
    ///
    /// The API key is resolved first; a failure on either aborts.
    pub async fn resolve_pair(&self, config: &SolverConfig, namespace: &str) -> Result<ProviderCredentials> {
        let api_key = self.resolve(&config.api_key_secret_ref, namespace).await?;
        let secret_key = self.resolve(&config.secret_key_secret_ref, namespace).await?;

        Ok(ProviderCredentials { api_key, secret_key })
    }
}
