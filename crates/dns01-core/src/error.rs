//! Error types for the DNS-01 solver
//!
//! This module defines all error types used throughout the crate.
//! Errors raised while handling a challenge are wrapped in [`Error::Stage`]
//! so that both the root cause and the failing step are visible to callers.

use std::fmt;
use thiserror::Error;

/// Result type alias for solver operations
pub type Result<T> = std::result::Result<T, Error>;

/// The step of a Present/CleanUp operation an error was raised in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Config decoding, credential resolution or client construction
    Initialization,
    /// Listing the records of the domain
    RetrieveRecords,
    /// Creating the challenge record
    CreateRecord,
    /// Deleting the challenge record
    DeleteRecord,
}

impl Stage {
    /// Short label used as the error prefix
    pub fn label(&self) -> &'static str {
        match self {
            Stage::Initialization => "initialization error",
            Stage::RetrieveRecords => "retrieve records error",
            Stage::CreateRecord => "create record error",
            Stage::DeleteRecord => "delete record error",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Core error type for the DNS-01 solver
#[derive(Error, Debug)]
pub enum Error {
    /// Solver configuration in the challenge request could not be decoded
    #[error("config error: {0}")]
    ConfigDecode(String),

    /// Secret does not exist or could not be read
    #[error("get error for secret {namespace:?} {name:?}: {message}")]
    SecretLookup {
        /// Namespace the lookup was scoped to
        namespace: String,
        /// Secret name
        name: String,
        /// Underlying store error
        message: String,
    },

    /// Secret exists but lacks the requested field
    #[error("secret {namespace:?} {name:?} does not contain key {key:?}")]
    SecretFieldMissing {
        /// Namespace the lookup was scoped to
        namespace: String,
        /// Secret name
        name: String,
        /// Field key that was requested
        key: String,
    },

    /// DNS provider API call failed
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },

    /// Provider returned a record identifier that is not a base-10 integer
    #[error("found TXT record, but its ID {id:?} is malformed: {message}")]
    MalformedRecordId {
        /// Identifier as returned by the provider
        id: String,
        /// Parse failure
        message: String,
    },

    /// Solver was used before `initialize`
    #[error("solver not initialized: {0}")]
    NotInitialized(String),

    /// Configuration errors (registry, bootstrap)
    #[error("Configuration error: {0}")]
    Config(String),

    /// An error annotated with the step it was raised in
    #[error("{stage}: {source}")]
    Stage {
        /// Failing step
        stage: Stage,
        /// Underlying error
        #[source]
        source: Box<Error>,
    },

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a config decode error
    pub fn config_decode(msg: impl Into<String>) -> Self {
        Self::ConfigDecode(msg.into())
    }

    /// Create a secret lookup error
    pub fn secret_lookup(
        namespace: impl Into<String>,
        name: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::SecretLookup {
            namespace: namespace.into(),
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create a missing secret field error
    pub fn secret_field_missing(
        namespace: impl Into<String>,
        name: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        Self::SecretFieldMissing {
            namespace: namespace.into(),
            name: name.into(),
            key: key.into(),
        }
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Wrap this error with the step it was raised in
    pub fn at(self, stage: Stage) -> Self {
        Self::Stage {
            stage,
            source: Box::new(self),
        }
    }

    /// The outermost stage label, if any
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// The underlying error with all stage wrappers removed
    pub fn root_cause(&self) -> &Error {
        let mut current = self;
        while let Self::Stage { source, .. } = current {
            current = source;
        }
        current
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
