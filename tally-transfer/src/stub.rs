//! Stub transfer backend for testing.
//!
//! Simulates immediate transfers without touching any real value. Records
//! every call so tests can assert exactly what settlement asked for, and
//! supports one-shot failure injection to exercise rollback paths.

use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use tally_domain::{AccountId, Amount, AssetId};

use crate::error::TransferError;
use crate::ports::{TransferPort, TransferReceipt};

/// Stub transfer backend.
///
/// Every successful call yields a receipt with a fresh time-ordered
/// reference id and is recorded for later inspection.
pub struct StubTransfer {
    /// Completed transfers, in call order
    completed: RwLock<Vec<TransferReceipt>>,
    /// Whether to fail the next transfer
    fail_next: RwLock<bool>,
}

impl StubTransfer {
    /// Create a new stub backend
    pub fn new() -> Self {
        Self {
            completed: RwLock::new(Vec::new()),
            fail_next: RwLock::new(false),
        }
    }

    /// Configure the next transfer to fail
    pub fn set_fail_next(&self, fail: bool) {
        let mut fail_next = self.fail_next.write().unwrap();
        *fail_next = fail;
    }

    /// Receipts of all completed transfers, in call order
    pub fn completed(&self) -> Vec<TransferReceipt> {
        self.completed.read().unwrap().clone()
    }

    /// Number of completed transfers
    pub fn completed_count(&self) -> usize {
        self.completed.read().unwrap().len()
    }

    /// Check if we should fail the next operation
    fn should_fail(&self) -> bool {
        let mut fail_next = self.fail_next.write().unwrap();
        let fail = *fail_next;
        *fail_next = false; // Reset after check
        fail
    }
}

impl Default for StubTransfer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TransferPort for StubTransfer {
    async fn transfer(
        &self,
        asset: &AssetId,
        debtor: &AccountId,
        creditor: &AccountId,
        amount: Amount,
    ) -> Result<TransferReceipt, TransferError> {
        if self.should_fail() {
            return Err(TransferError::Backend(
                "Simulated transfer failure".to_string(),
            ));
        }

        let receipt = TransferReceipt {
            reference: Uuid::now_v7().to_string(),
            asset: asset.clone(),
            debtor: debtor.clone(),
            creditor: creditor.clone(),
            amount,
            transferred_at: Utc::now(),
        };

        let mut completed = self.completed.write().map_err(|e| {
            TransferError::Backend(format!("Failed to acquire receipt lock: {}", e))
        })?;
        completed.push(receipt.clone());

        Ok(receipt)
    }

    async fn health_check(&self) -> Result<(), TransferError> {
        if self.should_fail() {
            return Err(TransferError::Unavailable(
                "Simulated health check failure".to_string(),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
