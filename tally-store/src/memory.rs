//! In-memory store with a serializing transaction boundary
//!
//! The reference implementation of the ledger's logical schema. Durable
//! persistence is a host concern; this store provides the concurrency
//! contract the engine relies on: strictly serialized mutations and
//! consistent read snapshots.

use std::sync::RwLock;

use crate::error::StoreError;
use crate::state::LedgerState;

/// Thread-safe store wrapping [`LedgerState`] in a single lock.
///
/// `transact` serializes every mutation against every other; `snapshot`
/// gives readers a consistent view that can never observe a half-applied
/// mutation. This is the single-writer model the ledger is designed for.
///
/// Transactions follow a validate-then-apply discipline: a closure must
/// perform all fallible checks before its first mutation, so an `Err`
/// return leaves the state untouched. Every transaction in the engine is
/// written this way; there is no physical undo log.
pub struct MemoryStore {
    state: RwLock<LedgerState>,
}

impl MemoryStore {
    /// Create a store with empty ledger state
    pub fn new() -> Self {
        Self {
            state: RwLock::new(LedgerState::new()),
        }
    }

    /// Run a read-only closure against a consistent snapshot
    ///
    /// # Errors
    /// Returns `StoreError::Conflict` if the lock is poisoned (a writer
    /// panicked mid-transaction).
    pub fn snapshot<R>(&self, f: impl FnOnce(&LedgerState) -> R) -> Result<R, StoreError> {
        let state = self
            .state
            .read()
            .map_err(|e| StoreError::conflict(format!("Failed to acquire read lock: {}", e)))?;

        Ok(f(&state))
    }

    /// Run a mutating closure as one serialized transaction
    ///
    /// The closure holds the sole write guard for its whole duration, so no
    /// other mutation or read interleaves with it. An `Err` return aborts
    /// the transaction; under the validate-then-apply discipline the state
    /// is unchanged in that case.
    ///
    /// # Errors
    /// `StoreError::Conflict` (as `E`) if the lock is poisoned, otherwise
    /// whatever the closure returns.
    pub fn transact<R, E>(
        &self,
        f: impl FnOnce(&mut LedgerState) -> Result<R, E>,
    ) -> Result<R, E>
    where
        E: From<StoreError>,
    {
        let mut state = self.state.write().map_err(|e| {
            E::from(StoreError::conflict(format!(
                "Failed to acquire write lock: {}",
                e
            )))
        })?;

        f(&mut state)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================
