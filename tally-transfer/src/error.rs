//! Transfer layer error types.

use thiserror::Error;

/// Errors reported by the value-transfer backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransferError {
    /// Backend communication error
    #[error("Transfer backend error: {0}")]
    Backend(String),

    /// Transfer was rejected by the backend
    #[error("Transfer rejected: {0}")]
    Rejected(String),

    /// Backend is unreachable or unhealthy
    #[error("Transfer backend unavailable: {0}")]
    Unavailable(String),
}
