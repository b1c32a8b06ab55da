//! Challenge reconciler
//!
//! The Reconciler is responsible for:
//! - Decoding the solver configuration of each request
//! - Resolving provider credentials in the request's namespace
//! - Listing the current record set of the domain
//! - Creating or deleting the challenge TXT record, only when needed
//!
//! ## Architecture
//!
//! ```text
//!                  ChallengeRequest
//!                         │
//!                         ▼
//!                 ┌──────────────┐
//!                 │  Reconciler  │
//!                 └──────────────┘
//!                         │
//!         ┌───────────────┴───────────────┐
//!         │                               │
//!         ▼                               ▼
//! ┌────────────────────┐         ┌─────────────────┐
//! │ CredentialResolver │         │  RecordClient   │
//! │ (SecretStore)      │         │ (list/create/   │
//! └────────────────────┘         │  delete)        │
//!                                └─────────────────┘
//! ```
//!
//! ## Record States
//!
//! There is no local state. Each pass observes the remote record set:
//!
//! | Observed | Present | CleanUp |
//! |----------|---------|---------|
//! | no matching record | create | no-op |
//! | matching record | no-op | delete (first match only) |
//! | same name, other content | left untouched | left untouched |
//!
//! ## Event Flow
//!
//! 1. Decode config, resolve both credentials, build a client
//! 2. List all records of the domain
//! 3. Find the first TXT record with the absolute name and the key as content
//! 4. Present: create if none found. CleanUp: parse its id and delete it if found
//!
//! Nothing is retried here; the webhook framework re-invokes on failure and
//! the pass converges because it is idempotent.

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use tracing::{debug, info};

use crate::challenge::ChallengeRequest;
use crate::config::SolverConfig;
use crate::credentials::CredentialResolver;
use crate::error::{Error, Result, Stage};
use crate::traits::{DnsRecord, NewRecord, RecordClient, RecordClientFactory, RecordId, SecretStore, Solver};

/// Result of a Present pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresentOutcome {
    /// The record was created
    Created(RecordId),
    /// A matching record already existed (no-op)
    AlreadyPresent(String),
}

/// Result of a CleanUp pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanUpOutcome {
    /// The matching record was deleted
    Deleted(RecordId),
    /// No matching record existed (no-op)
    NoMatch,
}

/// Idempotent DNS-01 challenge reconciler
///
/// ## Lifecycle
///
/// 1. Create with [`Reconciler::new()`]
/// 2. Hand it a secret store once with [`Solver::initialize()`]
/// 3. Call [`Solver::present()`] / [`Solver::clean_up()`] per challenge
///
/// ## Threading
///
/// The reconciler holds only immutable handles after initialization, so a
/// single instance serves concurrent operations without locking.
pub struct Reconciler {
    /// Solver name, taken from the provider
    name: &'static str,

    /// Builds a record client from each operation's credentials
    clients: Arc<dyn RecordClientFactory>,

    /// Secret store, set once by `initialize`
    secrets: OnceLock<Arc<dyn SecretStore>>,
}

impl Reconciler {
    /// Create a new reconciler for a provider
    ///
    /// The solver name is the provider name of `clients`.
    pub fn new(clients: Arc<dyn RecordClientFactory>) -> Self {
        Self {
            name: clients.provider_name(),
            clients,
            secrets: OnceLock::new(),
        }
    }

    /// Create a reconciler that is already initialized with a secret store
    pub fn with_secret_store(clients: Arc<dyn RecordClientFactory>, secrets: Arc<dyn SecretStore>) -> Self {
        let reconciler = Self::new(clients);
        let _ = reconciler.secrets.set(secrets);
        reconciler
    }

    /// Make sure the challenge record exists
    ///
    /// # Returns
    ///
    /// - `Ok(PresentOutcome::Created(id))`: No matching record existed, one was created
    /// - `Ok(PresentOutcome::AlreadyPresent(id))`: A matching record existed, nothing changed
    /// - `Err(Error::Stage { .. })`: A step failed; the stage names which one
    pub async fn present_record(&self, ch: &ChallengeRequest) -> Result<PresentOutcome> {
        info!(fqdn = %ch.resolved_fqdn, key = %ch.key, "Handling present request");

        let client = self.connect(ch).await.map_err(|e| e.at(Stage::Initialization))?;

        let domain = ch.domain();
        let records = client
            .list_records(domain)
            .await
            .map_err(|e| e.at(Stage::RetrieveRecords))?;

        if let Some(existing) = find_challenge_record(&records, ch.absolute_name(), &ch.key) {
            info!(record_id = %existing.id, "Record is already present");
            return Ok(PresentOutcome::AlreadyPresent(existing.id.clone()));
        }

        let id = client
            .create_record(domain, &NewRecord::txt(ch.entity(), &ch.key))
            .await
            .map_err(|e| e.at(Stage::CreateRecord))?;

        info!(record_id = id, fqdn = %ch.resolved_fqdn, "Created record");
        Ok(PresentOutcome::Created(id))
    }

    /// Make sure the challenge record no longer exists
    ///
    /// # Returns
    ///
    /// - `Ok(CleanUpOutcome::Deleted(id))`: The first matching record was deleted
    /// - `Ok(CleanUpOutcome::NoMatch)`: Nothing to delete
    /// - `Err(Error::MalformedRecordId { .. })`: The match has a non-numeric id; nothing was deleted
    /// - `Err(Error::Stage { .. })`: A step failed; the stage names which one
    pub async fn clean_up_record(&self, ch: &ChallengeRequest) -> Result<CleanUpOutcome> {
        info!(fqdn = %ch.resolved_fqdn, key = %ch.key, "Handling cleanup request");

        let client = self.connect(ch).await.map_err(|e| e.at(Stage::Initialization))?;

        let domain = ch.domain();
        let records = client
            .list_records(domain)
            .await
            .map_err(|e| e.at(Stage::RetrieveRecords))?;

        let Some(record) = find_challenge_record(&records, ch.absolute_name(), &ch.key) else {
            info!(fqdn = %ch.resolved_fqdn, "No matching record to delete");
            return Ok(CleanUpOutcome::NoMatch);
        };

        let id = parse_record_id(&record.id)?;

        client
            .delete_record(domain, id)
            .await
            .map_err(|e| e.at(Stage::DeleteRecord))?;

        info!(record_id = id, fqdn = %ch.resolved_fqdn, "Deleted record");
        Ok(CleanUpOutcome::Deleted(id))
    }

    /// Decode config, resolve credentials and build a client for one operation
    async fn connect(&self, ch: &ChallengeRequest) -> Result<Box<dyn RecordClient>> {
        let secrets = self
            .secrets
            .get()
            .ok_or_else(|| Error::NotInitialized(format!("{} solver has no secret store", self.name)))?;

        let config = SolverConfig::from_request_config(ch.config.as_ref())?;

        let credentials = CredentialResolver::new(secrets.as_ref())
            .resolve_pair(&config, &ch.resource_namespace)
            .await?;

        let client = self.clients.create(credentials)?;
        debug!(provider = client.provider_name(), domain = ch.domain(), "Record client ready");

        Ok(client)
    }
}

#[async_trait]
impl Solver for Reconciler {
    fn name(&self) -> &str {
        self.name
    }

    fn initialize(&self, secrets: Arc<dyn SecretStore>) -> Result<()> {
        info!(solver = self.name, store = secrets.store_name(), "Initializing");

        self.secrets
            .set(secrets)
            .map_err(|_| Error::config(format!("{} solver is already initialized", self.name)))
    }

    async fn present(&self, request: &ChallengeRequest) -> Result<()> {
        self.present_record(request).await.map(|_| ())
    }

    async fn clean_up(&self, request: &ChallengeRequest) -> Result<()> {
        self.clean_up_record(request).await.map(|_| ())
    }
}

/// First record in listing order that is the challenge record
fn find_challenge_record<'a>(records: &'a [DnsRecord], absolute_name: &str, key: &str) -> Option<&'a DnsRecord> {
    records
        .iter()
        .find(|record| record.matches_challenge(absolute_name, key))
}

/// Parse a provider record id as a base-10 integer
fn parse_record_id(id: &str) -> Result<RecordId> {
    id.parse::<RecordId>().map_err(|e| Error::MalformedRecordId {
        id: id.to_string(),
        message: e.to_string(),
    })
}
