// # Secret Store Trait
//
// Defines the interface for the key/value secret lookup service that
// provider credentials are read from.
//
// ## Implementations
//
// - Kubernetes Secrets: `dns01-secrets-kube` crate

use async_trait::async_trait;
use std::collections::BTreeMap;

/// Trait for secret store implementations
///
/// # Thread Safety
///
/// One store handle is shared by every concurrent operation, so all methods
/// must be safe to call concurrently.
///
/// # Security
///
/// Implementations must not log secret data and must not fall back to any
/// namespace other than the one passed in.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Read a secret by name within a namespace
    ///
    /// # Returns
    ///
    /// - `Ok(map)`: Field key → raw bytes (empty if the secret has no data)
    /// - `Err(Error::SecretLookup)`: The secret does not exist or is inaccessible
    async fn get_secret(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<BTreeMap<String, Vec<u8>>, crate::Error>;

    /// Get the store name (for logging/debugging)
    fn store_name(&self) -> &'static str;
}
