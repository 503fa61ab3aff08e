//! Ledger engine error types.

use thiserror::Error;

use tally_domain::{AccountId, AssetId, DomainError, ProposalId};
use tally_store::StoreError;
use tally_transfer::TransferError;

/// Errors that can occur during ledger operations.
///
/// All errors are synchronous, deterministic, and local: a failed operation
/// leaves every piece of state exactly as it found it. Only `Conflict`
/// warrants a blind retry; everything else indicates a caller error or a
/// business-rule violation and must not be retried unchanged.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Operands violate a precondition (debtor = creditor, or a
    /// non-positive amount at the point it is checked)
    #[error("Invalid operands: {0}")]
    InvalidOperands(String),

    /// Unknown or already-resolved proposal id
    #[error("No open proposal {0}")]
    NotFound(ProposalId),

    /// Caller lacks the required role for the operation
    #[error("Unauthorized: {caller} {reason}")]
    Unauthorized {
        /// The account that attempted the operation
        caller: AccountId,
        /// Why the caller is not allowed
        reason: String,
    },

    /// The ledger entry to settle is zero
    #[error("Nothing to settle: {debtor} owes {creditor} nothing in {asset}")]
    NothingToSettle {
        /// Asset of the attempted settlement
        asset: AssetId,
        /// Account that would have paid
        debtor: AccountId,
        /// Account that would have been paid
        creditor: AccountId,
    },

    /// The external transfer backend reported failure; the settlement was
    /// rolled back in full
    #[error("Transfer failed: {0}")]
    TransferFailed(#[from] TransferError),

    /// An amount exceeded the asset's smallest-unit range
    #[error("Amount overflow: {0}")]
    Overflow(String),

    /// Transaction aborted by the store; retryable
    #[error(transparent)]
    Conflict(#[from] StoreError),

    /// Domain invariant violation
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),
}

/// Result type for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;
