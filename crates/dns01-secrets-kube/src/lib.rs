// # Kubernetes Secret Store
//
// Reads solver credentials from Kubernetes Secrets in the namespace of the
// triggering challenge request.
//
// ## Access Rules
//
// - Lookups are always namespaced; there is no cluster-wide or default-namespace fallback
// - Only `get` on a single named Secret is performed (RBAC: `secrets/get`)
// - Secret values are returned to the caller and never logged

use std::collections::BTreeMap;

use async_trait::async_trait;
use dns01_core::traits::SecretStore;
use dns01_core::{Error, Result};
use k8s_openapi::api::core::v1::Secret;
use kube::{Api, Client};

/// Secret store backed by the Kubernetes API
#[derive(Clone)]
pub struct KubeSecretStore {
    client: Client,
}

impl KubeSecretStore {
    /// Wrap an existing Kubernetes client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Connect using the in-cluster service account or the local kubeconfig
    ///
    /// # Returns
    ///
    /// - `Err(Error::Config)`: No usable cluster configuration was found
    pub async fn try_default() -> Result<Self> {
        let client = Client::try_default()
            .await
            .map_err(|e| Error::config(format!("Failed to create Kubernetes client: {e}")))?;

        tracing::debug!(namespace = client.default_namespace(), "Kubernetes client ready");
        Ok(Self::new(client))
    }
}

#[async_trait]
impl SecretStore for KubeSecretStore {
    async fn get_secret(&self, namespace: &str, name: &str) -> Result<BTreeMap<String, Vec<u8>>> {
        tracing::debug!(namespace = %namespace, secret = %name, "Fetching secret");

        let secrets: Api<Secret> = Api::namespaced(self.client.clone(), namespace);
        let secret = secrets
            .get(name)
            .await
            .map_err(|e| Error::secret_lookup(namespace, name, e.to_string()))?;

        Ok(secret_data(secret))
    }

    fn store_name(&self) -> &'static str {
        "kubernetes"
    }
}

/// Decoded fields of a Secret
///
/// `data` is already base64-decoded by the API client. A Secret without
/// data yields an empty map, so every field lookup reports it as missing.
fn secret_data(secret: Secret) -> BTreeMap<String, Vec<u8>> {
    secret
        .data
        .unwrap_or_default()
        .into_iter()
        .map(|(key, value)| (key, value.0))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::ByteString;

    #[test]
    fn test_secret_data_is_decoded_bytes() {
        let secret = Secret {
            data: Some(BTreeMap::from([
                ("api-key".to_string(), ByteString(b"pk1_abc".to_vec())),
                ("secret-key".to_string(), ByteString(b"sk1_def".to_vec())),
            ])),
            ..Default::default()
        };

        let data = secret_data(secret);
        assert_eq!(data.len(), 2);
        assert_eq!(data["api-key"], b"pk1_abc");
        assert_eq!(data["secret-key"], b"sk1_def");
    }

    #[test]
    fn test_secret_without_data_is_empty() {
        assert!(secret_data(Secret::default()).is_empty());
    }

    #[test]
    fn test_binary_values_are_kept_verbatim() {
        let secret = Secret {
            data: Some(BTreeMap::from([(
                "api-key".to_string(),
                ByteString(vec![0xff, 0xfe, 0x00]),
            )])),
            ..Default::default()
        };

        assert_eq!(secret_data(secret)["api-key"], vec![0xff, 0xfe, 0x00]);
    }
}
