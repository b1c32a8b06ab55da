//! Test doubles and common utilities for solver contract tests
//!
//! This module provides in-memory stand-ins for the secret store and the
//! DNS provider that count every call, so tests can assert exactly which
//! remote operations a Present/CleanUp pass performed.

#![allow(dead_code)]

use async_trait::async_trait;
use dns01_core::credentials::ProviderCredentials;
use dns01_core::error::{Error, Result};
use dns01_core::traits::{DnsRecord, NewRecord, RecordClient, RecordClientFactory, RecordId, SecretStore};
use dns01_core::{ChallengeRequest, Reconciler};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const NAMESPACE: &str = "team-a";
pub const SECRET_NAME: &str = "porkbun-credentials";
pub const API_KEY: &str = "pk1_test_api_key";
pub const SECRET_KEY: &str = "sk1_test_secret_key";

/// A secret store backed by a map, counting lookups
pub struct MemorySecretStore {
    secrets: Mutex<HashMap<(String, String), BTreeMap<String, Vec<u8>>>>,
    lookup_count: AtomicUsize,
}

impl MemorySecretStore {
    pub fn new() -> Self {
        Self {
            secrets: Mutex::new(HashMap::new()),
            lookup_count: AtomicUsize::new(0),
        }
    }

    /// A store holding the default provider credentials in `NAMESPACE`
    pub fn with_credentials() -> Self {
        let store = Self::new();
        store.insert(NAMESPACE, SECRET_NAME, &[("api-key", API_KEY), ("secret-key", SECRET_KEY)]);
        store
    }

    pub fn insert(&self, namespace: &str, name: &str, fields: &[(&str, &str)]) {
        let data = fields
            .iter()
            .map(|(k, v)| (k.to_string(), v.as_bytes().to_vec()))
            .collect();
        self.secrets
            .lock()
            .unwrap()
            .insert((namespace.to_string(), name.to_string()), data);
    }

    /// Get the number of times get_secret() was called
    pub fn lookup_count(&self) -> usize {
        self.lookup_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SecretStore for MemorySecretStore {
    async fn get_secret(&self, namespace: &str, name: &str) -> Result<BTreeMap<String, Vec<u8>>> {
        self.lookup_count.fetch_add(1, Ordering::SeqCst);
        self.secrets
            .lock()
            .unwrap()
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
            .ok_or_else(|| Error::secret_lookup(namespace, name, format!("secrets \"{name}\" not found")))
    }

    fn store_name(&self) -> &'static str {
        "memory"
    }
}

/// Which provider call should fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailOn {
    List,
    Create,
    Delete,
}

/// Remote record set shared by every client the fake factory builds
///
/// Listings report absolute names (`name.domain`) the way the provider does,
/// while creates take zone-relative names.
pub struct FakeProvider {
    records: Mutex<Vec<DnsRecord>>,
    next_id: AtomicU64,
    fail_on: Mutex<Option<FailOn>>,
    list_delay: Mutex<Option<Duration>>,
    clients_built: AtomicUsize,
    list_count: AtomicUsize,
    create_count: AtomicUsize,
    delete_count: AtomicUsize,
    created: Mutex<Vec<NewRecord>>,
    credentials_ok: AtomicBool,
}

impl FakeProvider {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            records: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1000),
            fail_on: Mutex::new(None),
            list_delay: Mutex::new(None),
            clients_built: AtomicUsize::new(0),
            list_count: AtomicUsize::new(0),
            create_count: AtomicUsize::new(0),
            delete_count: AtomicUsize::new(0),
            created: Mutex::new(Vec::new()),
            credentials_ok: AtomicBool::new(true),
        })
    }

    /// Seed a record as the provider would list it
    pub fn seed(&self, id: &str, record_type: &str, name: &str, content: &str) {
        self.records.lock().unwrap().push(DnsRecord {
            id: id.to_string(),
            record_type: record_type.to_string(),
            name: name.to_string(),
            content: content.to_string(),
            ttl: Some("600".to_string()),
        });
    }

    pub fn fail_on(&self, call: FailOn) {
        *self.fail_on.lock().unwrap() = Some(call);
    }

    pub fn delay_listing(&self, delay: Duration) {
        *self.list_delay.lock().unwrap() = Some(delay);
    }

    pub fn records(&self) -> Vec<DnsRecord> {
        self.records.lock().unwrap().clone()
    }

    /// Records matching the challenge predicate, as a fresh scan would see them
    pub fn matching(&self, absolute_name: &str, key: &str) -> Vec<DnsRecord> {
        self.records()
            .into_iter()
            .filter(|r| r.matches_challenge(absolute_name, key))
            .collect()
    }

    pub fn created(&self) -> Vec<NewRecord> {
        self.created.lock().unwrap().clone()
    }

    pub fn clients_built(&self) -> usize {
        self.clients_built.load(Ordering::SeqCst)
    }

    pub fn list_count(&self) -> usize {
        self.list_count.load(Ordering::SeqCst)
    }

    pub fn create_count(&self) -> usize {
        self.create_count.load(Ordering::SeqCst)
    }

    pub fn delete_count(&self) -> usize {
        self.delete_count.load(Ordering::SeqCst)
    }

    /// Total number of remote calls of any kind
    pub fn remote_calls(&self) -> usize {
        self.list_count() + self.create_count() + self.delete_count()
    }

    /// Whether every client was built from the expected credential pair
    pub fn credentials_ok(&self) -> bool {
        self.credentials_ok.load(Ordering::SeqCst)
    }

    fn should_fail(&self, call: FailOn) -> bool {
        *self.fail_on.lock().unwrap() == Some(call)
    }
}

/// Factory building clients over a shared [`FakeProvider`]
pub struct FakeFactory {
    pub provider: Arc<FakeProvider>,
}

impl RecordClientFactory for FakeFactory {
    fn create(&self, credentials: ProviderCredentials) -> Result<Box<dyn RecordClient>> {
        self.provider.clients_built.fetch_add(1, Ordering::SeqCst);
        if credentials.api_key.expose() != API_KEY || credentials.secret_key.expose() != SECRET_KEY {
            self.provider.credentials_ok.store(false, Ordering::SeqCst);
        }
        Ok(Box::new(FakeClient {
            provider: Arc::clone(&self.provider),
        }))
    }

    fn provider_name(&self) -> &'static str {
        "fake"
    }
}

struct FakeClient {
    provider: Arc<FakeProvider>,
}

#[async_trait]
impl RecordClient for FakeClient {
    async fn list_records(&self, _domain: &str) -> Result<Vec<DnsRecord>> {
        self.provider.list_count.fetch_add(1, Ordering::SeqCst);

        let delay = *self.provider.list_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.provider.should_fail(FailOn::List) {
            return Err(Error::provider("fake", "HTTP 503 Service Unavailable"));
        }
        Ok(self.provider.records())
    }

    async fn create_record(&self, domain: &str, record: &NewRecord) -> Result<RecordId> {
        self.provider.create_count.fetch_add(1, Ordering::SeqCst);
        if self.provider.should_fail(FailOn::Create) {
            return Err(Error::provider("fake", "HTTP 400 invalid record"));
        }

        let id = self.provider.next_id.fetch_add(1, Ordering::SeqCst);
        let name = if record.name.is_empty() {
            domain.to_string()
        } else {
            format!("{}.{}", record.name, domain)
        };

        self.provider.created.lock().unwrap().push(record.clone());
        self.provider.records.lock().unwrap().push(DnsRecord {
            id: id.to_string(),
            record_type: record.record_type.clone(),
            name,
            content: record.content.clone(),
            ttl: Some(record.ttl.to_string()),
        });
        Ok(id)
    }

    async fn delete_record(&self, _domain: &str, id: RecordId) -> Result<()> {
        self.provider.delete_count.fetch_add(1, Ordering::SeqCst);
        if self.provider.should_fail(FailOn::Delete) {
            return Err(Error::provider("fake", "HTTP 500 Internal Server Error"));
        }

        let id = id.to_string();
        let mut records = self.provider.records.lock().unwrap();
        let before = records.len();
        records.retain(|r| r.id != id);
        if records.len() == before {
            return Err(Error::provider("fake", format!("record {id} not found")));
        }
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "fake"
    }
}

/// Solver configuration pointing at the default credentials secret
pub fn solver_config() -> serde_json::Value {
    serde_json::json!({
        "apiKeySecretRef": { "name": SECRET_NAME, "key": "api-key" },
        "secretKeySecretRef": { "name": SECRET_NAME, "key": "secret-key" }
    })
}

/// The reference challenge: `_acme-challenge.example.com.` in `example.com.`
pub fn challenge(key: &str) -> ChallengeRequest {
    ChallengeRequest::new("_acme-challenge.example.com.", "example.com.", key, NAMESPACE)
        .with_config(solver_config())
}

/// An initialized reconciler over the given fakes
pub fn reconciler(provider: &Arc<FakeProvider>, store: &Arc<MemorySecretStore>) -> Reconciler {
    Reconciler::with_secret_store(
        Arc::new(FakeFactory {
            provider: Arc::clone(provider),
        }),
        Arc::clone(store) as Arc<dyn SecretStore>,
    )
}
