//! Transfer port definition.
//!
//! The port is the seam between the pure ledger core and the impure world
//! that actually moves asset units. Adapters implement it for specific
//! backends (on-chain transfer, payment rail, stub for tests).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tally_domain::{AccountId, Amount, AssetId};

use crate::error::TransferError;

// =============================================================================
// Transfer Port
// =============================================================================

/// Port for moving asset units between accounts.
///
/// Implementations:
/// - `StubTransfer` - For testing (records calls, injectable failures)
/// - Host-provided adapters for real value movement
///
/// Settlement invokes `transfer` while its ledger entry is already zeroed;
/// an implementation that calls back into the ledger will observe a zero
/// balance for the pair being settled.
#[async_trait]
pub trait TransferPort: Send + Sync {
    /// Move `amount` of `asset` from `debtor` to `creditor`.
    ///
    /// # Returns
    ///
    /// `TransferReceipt` on success. Failure must be returned as an error;
    /// the caller rolls the settlement back on any error.
    async fn transfer(
        &self,
        asset: &AssetId,
        debtor: &AccountId,
        creditor: &AccountId,
        amount: Amount,
    ) -> Result<TransferReceipt, TransferError>;

    /// Check if the backend is healthy/reachable.
    async fn health_check(&self) -> Result<(), TransferError>;
}

/// Result of a successful value transfer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferReceipt {
    /// Backend-assigned reference (e.g., a transaction hash)
    pub reference: String,
    /// Asset that was moved
    pub asset: AssetId,
    /// Account that paid
    pub debtor: AccountId,
    /// Account that was paid
    pub creditor: AccountId,
    /// Amount moved, in smallest units
    pub amount: Amount,
    /// When the transfer completed
    pub transferred_at: DateTime<Utc>,
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_receipt_serialization() {
        let receipt = TransferReceipt {
            reference: "0xfeed".to_string(),
            asset: AssetId::new("USDC").unwrap(),
            debtor: AccountId::new("alice").unwrap(),
            creditor: AccountId::new("bob").unwrap(),
            amount: Amount::new(50),
            transferred_at: Utc::now(),
        };

        let json = serde_json::to_string(&receipt).unwrap();
        let parsed: TransferReceipt = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed, receipt);
        assert_eq!(parsed.reference, "0xfeed");
    }
}
