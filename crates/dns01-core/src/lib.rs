// # dns01-core
//
// Core library for the DNS-01 challenge solver.
//
// ## Architecture Overview
//
// This library holds everything the solver decides on its own:
// - **ChallengeRequest**: The per-operation request handed in by the webhook framework
// - **CredentialResolver**: Turns secret references into plaintext provider credentials
// - **RecordClient**: Trait seam over a DNS provider's TXT record CRUD operations
// - **SecretStore**: Trait seam over the secret lookup service
// - **Reconciler**: Idempotent Present/CleanUp logic over the remote record set
// - **SolverRegistry**: Name-keyed registry of solvers served under one group
//
// ## Design Principles
//
// 1. **Stateless**: Every operation lists the remote record set afresh, nothing is cached
// 2. **Idempotent**: Present and CleanUp can be repeated with the same request safely
// 3. **Plugin-Based**: Providers and secret stores live in their own crates
// 4. **Library-First**: The daemon is a thin integration layer over this crate

pub mod challenge;
pub mod config;
pub mod credentials;
pub mod error;
pub mod reconciler;
pub mod registry;
pub mod traits;

// Re-export core types for convenience
pub use challenge::ChallengeRequest;
pub use config::{SecretKeySelector, SolverConfig, CHALLENGE_TTL};
pub use credentials::{Credential, CredentialResolver, ProviderCredentials};
pub use error::{Error, Result, Stage};
pub use reconciler::{CleanUpOutcome, PresentOutcome, Reconciler};
pub use registry::SolverRegistry;
pub use traits::{DnsRecord, NewRecord, RecordClient, RecordClientFactory, RecordId, SecretStore, Solver};
