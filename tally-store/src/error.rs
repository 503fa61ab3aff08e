//! Storage layer errors

use thiserror::Error;

/// Errors that can occur at the storage boundary
#[derive(Debug, Error)]
pub enum StoreError {
    /// Two mutations attempted to observe or modify the same state
    /// concurrently and the transaction was aborted.
    ///
    /// This is the one retryable error in the taxonomy: the aborted caller
    /// may blindly retry. With the in-memory store it arises only when a
    /// writer panicked mid-transaction and poisoned the lock.
    #[error("Transaction conflict: {message}")]
    Conflict {
        /// Description of the aborted transaction
        message: String,
    },
}

impl StoreError {
    /// Create a conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }
}
