// # Solver Trait
//
// The inbound contract consumed by the webhook framework. The framework
// calls `initialize` once at startup, then `present`/`clean_up` for each
// challenge, possibly concurrently and possibly more than once for the same
// challenge when it retries.

use async_trait::async_trait;
use std::sync::Arc;

use crate::challenge::ChallengeRequest;
use crate::traits::SecretStore;

/// Trait for DNS-01 solver implementations
#[async_trait]
pub trait Solver: Send + Sync {
    /// Fixed identifier used to disambiguate solvers served under one group
    fn name(&self) -> &str;

    /// One-time setup handing the solver its secret store handle
    ///
    /// Calling it a second time is an error.
    fn initialize(&self, secrets: Arc<dyn SecretStore>) -> Result<(), crate::Error>;

    /// Make sure the challenge TXT record exists
    ///
    /// Must succeed without changes when the record is already present.
    async fn present(&self, request: &ChallengeRequest) -> Result<(), crate::Error>;

    /// Make sure the challenge TXT record no longer exists
    ///
    /// Must succeed without changes when the record is already absent.
    async fn clean_up(&self, request: &ChallengeRequest) -> Result<(), crate::Error>;
}
