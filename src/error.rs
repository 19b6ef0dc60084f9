/*!
# Error Module

Error taxonomy shared by every layer of the lite query client.

## Error Types
- `Timeout`: a physical call exceeded its budget
- `Transport`: the underlying connection or peer failed
- `NotFound`: the remote has no data for the requested coordinates
- `MalformedResponse`: bytes or envelopes did not have the expected shape
- `ProofMismatch`: returned identities or proofs disagree with what was requested
- `Config`: client configuration rejected by validation

## Propagation

Nothing is recovered inside the crate. Composite operations (full block
reconstruction, account resolution) abort with the first error they observe.
Errors are `Clone` because a single batched lookup result is delivered to every
caller waiting on the same key.
*/

use std::time::Duration;
use thiserror::Error;

/// Core lite query error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LiteError {
    /// Call exceeded its time budget
    #[error("Timeout: {method} did not complete within {after:?}")]
    Timeout {
        method: &'static str,
        after: Duration,
    },

    /// Transport-level fault
    #[error("Transport error: {0}")]
    Transport(String),

    /// Remote has no such data
    #[error("Not found: {0}")]
    NotFound(String),

    /// Response failed to parse against the expected shape
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Hashes or proof contents disagree with the claimed identity
    #[error("Proof mismatch: {0}")]
    ProofMismatch(String),

    /// Invalid client configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl LiteError {
    /// Check if the error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            LiteError::Timeout { .. } => true,
            LiteError::Transport(_) => true,
            LiteError::NotFound(_) => false,
            LiteError::MalformedResponse(_) => false,
            LiteError::ProofMismatch(_) => false,
            LiteError::Config(_) => false,
        }
    }

    /// Get error severity
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            LiteError::Timeout { .. } => ErrorSeverity::Warning,
            LiteError::Transport(_) => ErrorSeverity::Warning,
            LiteError::NotFound(_) => ErrorSeverity::Error,
            LiteError::MalformedResponse(_) => ErrorSeverity::Error,
            LiteError::ProofMismatch(_) => ErrorSeverity::Critical,
            LiteError::Config(_) => ErrorSeverity::Critical,
        }
    }

    pub(crate) fn malformed(what: impl Into<String>) -> Self {
        LiteError::MalformedResponse(what.into())
    }

    pub(crate) fn mismatch(what: impl Into<String>) -> Self {
        LiteError::ProofMismatch(what.into())
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Warning - operation can be retried as a whole
    Warning,
    /// Error - the request itself cannot succeed as issued
    Error,
    /// Critical - the peer returned inconsistent data
    Critical,
}

impl From<serde_json::Error> for LiteError {
    fn from(err: serde_json::Error) -> Self {
        LiteError::Config(err.to_string())
    }
}
