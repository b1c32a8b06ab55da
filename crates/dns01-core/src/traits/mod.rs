//! Core traits for the DNS-01 solver
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`RecordClient`]: DNS provider record CRUD
//! - [`SecretStore`]: Secret lookup for provider credentials
//! - [`Solver`]: Inbound contract consumed by the webhook framework

pub mod record_client;
pub mod secret_store;
pub mod solver;

pub use record_client::{DnsRecord, NewRecord, RecordClient, RecordClientFactory, RecordId};
pub use secret_store::SecretStore;
pub use solver::Solver;
