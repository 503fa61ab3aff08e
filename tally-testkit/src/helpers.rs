//! Fixture and seeding helpers.

use std::sync::Arc;

use anyhow::Result;
use tally_domain::{AccountId, Amount, AssetId, ProposalId};
use tally_engine::Ledger;
use tally_store::MemoryStore;
use tally_transfer::StubTransfer;

/// Account literal; panics on invalid input (test code only).
pub fn account(id: &str) -> AccountId {
    AccountId::new(id).expect("valid account id")
}

/// Asset literal; panics on invalid input (test code only).
pub fn asset(id: &str) -> AssetId {
    AssetId::new(id).expect("valid asset id")
}

/// Amount literal in smallest units.
pub fn amount(units: u128) -> Amount {
    Amount::new(units)
}

/// A stub-backed ledger with handles to everything a test wants to poke.
pub struct TestLedger {
    /// The write-side service under test
    pub ledger: Ledger<StubTransfer>,
    /// The shared store, for snapshots and read-side calls
    pub store: Arc<MemoryStore>,
    /// The stub transfer backend, for call inspection and failure injection
    pub transfer: Arc<StubTransfer>,
}

impl TestLedger {
    /// Propose a debt and confirm it as the debtor.
    ///
    /// Returns the proposal id.
    pub async fn seed_confirmed(
        &self,
        creditor: &AccountId,
        debtor: &AccountId,
        asset: &AssetId,
        amount: Amount,
        memo: &str,
    ) -> Result<ProposalId> {
        let id = self
            .ledger
            .propose(creditor, debtor, asset, amount, memo)
            .await?;
        self.ledger.confirm(id, debtor).await?;
        Ok(id)
    }

    /// Propose a debt and leave it open.
    pub async fn seed_open(
        &self,
        creditor: &AccountId,
        debtor: &AccountId,
        asset: &AssetId,
        amount: Amount,
        memo: &str,
    ) -> Result<ProposalId> {
        Ok(self
            .ledger
            .propose(creditor, debtor, asset, amount, memo)
            .await?)
    }
}

/// Create a ledger over a fresh store and stub transfer backend.
pub fn test_ledger() -> TestLedger {
    let store = Arc::new(MemoryStore::new());
    let transfer = Arc::new(StubTransfer::new());
    let ledger = Ledger::new(Arc::clone(&store), Arc::clone(&transfer));

    TestLedger {
        ledger,
        store,
        transfer,
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_seed_confirmed_moves_balance() {
        let t = test_ledger();
        t.seed_confirmed(&account("alice"), &account("bob"), &asset("USDC"), amount(100), "")
            .await
            .unwrap();

        let owed = t
            .store
            .snapshot(|state| state.entry(&asset("USDC"), &account("bob"), &account("alice")))
            .unwrap();
        assert_eq!(owed, amount(100));
    }

    #[tokio::test]
    async fn test_seed_open_leaves_balance_untouched() {
        let t = test_ledger();
        let id = t
            .seed_open(&account("alice"), &account("bob"), &asset("USDC"), amount(100), "")
            .await
            .unwrap();

        assert!(t.store.snapshot(|state| state.is_open(id)).unwrap());
        let owed = t
            .store
            .snapshot(|state| state.entry(&asset("USDC"), &account("bob"), &account("alice")))
            .unwrap();
        assert!(owed.is_zero());
    }
}
