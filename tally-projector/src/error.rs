//! Projection errors

use thiserror::Error;

/// Errors that can occur while deriving read views
#[derive(Debug, Error)]
pub enum ProjectionError {
    /// Replaying the log produced a different result than live state
    #[error("Replay diverged from live state: {detail}")]
    Divergence {
        /// What differed, with expected (replayed) and actual (live) values
        detail: String,
    },

    /// A pending total exceeded the representable amount range
    #[error("Amount overflow while folding: {0}")]
    Overflow(String),

    /// Store error passthrough
    #[error(transparent)]
    Store(#[from] tally_store::StoreError),
}

/// Result type for projection operations
pub type Result<T> = std::result::Result<T, ProjectionError>;
