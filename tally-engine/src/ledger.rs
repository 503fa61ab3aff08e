//! Ledger service: the consent-gated write side.
//!
//! Orchestrates the proposal state machine, the netting engine, and the
//! settlement path over the store's transaction boundary.
//!
//! # Flow
//!
//! ```text
//! propose → (debtor) confirm → netting → DebtAdded + DebtConfirmed
//!         → (either party) reject → DebtRejected
//! settle  → zero entry → external transfer → DebtSettled (or rollback)
//! ```

use std::sync::Arc;

use tracing::{debug, error, info};

use tally_domain::{AccountId, Amount, AssetId, DebtProposal, LedgerEvent, ProposalId};
use tally_eventlog::EventRecord;
use tally_store::MemoryStore;
use tally_transfer::{TransferPort, TransferReceipt};

use crate::error::{LedgerError, LedgerResult};
use crate::netting;

// =============================================================================
// Ledger
// =============================================================================

/// The debt ledger's write-side service.
///
/// Holds the authoritative store and the value-transfer backend used by
/// settlement. Each operation commits as one serialized transaction; a
/// failed operation leaves no trace in the entries, the proposal set, or
/// the event log.
pub struct Ledger<T: TransferPort> {
    /// Authoritative state behind its transaction boundary
    store: Arc<MemoryStore>,
    /// Value-transfer backend for settlement
    transfer: Arc<T>,
}

impl<T: TransferPort> Clone for Ledger<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            transfer: Arc::clone(&self.transfer),
        }
    }
}

impl<T: TransferPort> Ledger<T> {
    /// Create a new ledger service.
    pub fn new(store: Arc<MemoryStore>, transfer: Arc<T>) -> Self {
        Self { store, transfer }
    }

    /// Get the underlying store (for the read side and for tests).
    pub fn store(&self) -> &Arc<MemoryStore> {
        &self.store
    }

    /// Record a debt proposal awaiting the debtor's consent.
    ///
    /// Only `creditor != debtor` is checked here. The amount is NOT
    /// validated: a zero amount passes propose and fails at confirmation,
    /// where the netting precondition applies. Rejection is the only
    /// terminal path for such a proposal.
    ///
    /// # Errors
    /// - `InvalidOperands` if `creditor == debtor`
    pub async fn propose(
        &self,
        creditor: &AccountId,
        debtor: &AccountId,
        asset: &AssetId,
        amount: Amount,
        memo: &str,
    ) -> LedgerResult<ProposalId> {
        if creditor == debtor {
            return Err(LedgerError::InvalidOperands(format!(
                "Creditor and debtor must differ, got {} for both",
                creditor
            )));
        }

        let id = self.store.transact(|state| -> LedgerResult<ProposalId> {
            let id = state.allocate_proposal_id();
            let proposal = DebtProposal::new(
                id,
                creditor.clone(),
                debtor.clone(),
                asset.clone(),
                amount,
                memo,
            );

            state.append_event(LedgerEvent::DebtProposed {
                id,
                creditor: creditor.clone(),
                debtor: debtor.clone(),
                asset: asset.clone(),
                amount,
                memo: memo.to_string(),
            });
            state.insert_open_proposal(proposal);

            Ok(id)
        })?;

        info!(
            proposal = %id,
            %creditor,
            %debtor,
            %asset,
            %amount,
            "Debt proposed"
        );

        Ok(id)
    }

    /// Confirm a proposal as its debtor, applying the debt to the ledger.
    ///
    /// Runs the netting engine with the stored parameters, removes the
    /// proposal from the open set, and appends `DebtAdded` then
    /// `DebtConfirmed`, all in one transaction. A second confirmation of
    /// the same id fails `NotFound` because the open entry is gone.
    ///
    /// Returns the `DebtAdded` record.
    ///
    /// # Errors
    /// - `NotFound` if no open proposal exists for `id`
    /// - `Unauthorized` if `caller` is not the proposal's debtor
    /// - `InvalidOperands` if the stored amount is zero (the deferred
    ///   positivity check); the proposal stays open
    pub async fn confirm(&self, id: ProposalId, caller: &AccountId) -> LedgerResult<EventRecord> {
        let record = self.store.transact(|state| -> LedgerResult<EventRecord> {
            let proposal = state
                .open_proposal(id)
                .ok_or(LedgerError::NotFound(id))?
                .clone();

            if caller != &proposal.debtor {
                return Err(LedgerError::Unauthorized {
                    caller: caller.clone(),
                    reason: format!("is not the debtor of proposal {}", id),
                });
            }

            // The netting precondition is where a zero amount fails; the
            // proposal must remain open in that case, so apply before remove.
            let record = netting::apply_debt(
                state,
                &proposal.asset,
                &proposal.debtor,
                &proposal.creditor,
                proposal.amount,
                &proposal.memo,
            )?;

            let mut resolved = state
                .remove_open_proposal(id)
                .ok_or(LedgerError::NotFound(id))?;
            resolved.confirm()?;

            state.append_event(LedgerEvent::DebtConfirmed { id });

            Ok(record)
        })?;

        info!(proposal = %id, caller = %caller, "Debt confirmed");

        Ok(record)
    }

    /// Reject a proposal as either party, discarding it.
    ///
    /// # Errors
    /// - `NotFound` if no open proposal exists for `id`
    /// - `Unauthorized` if `caller` is neither creditor nor debtor
    pub async fn reject(&self, id: ProposalId, caller: &AccountId) -> LedgerResult<()> {
        self.store.transact(|state| -> LedgerResult<()> {
            let proposal = state.open_proposal(id).ok_or(LedgerError::NotFound(id))?;

            if !proposal.involves(caller) {
                return Err(LedgerError::Unauthorized {
                    caller: caller.clone(),
                    reason: format!("is not a party to proposal {}", id),
                });
            }

            let mut resolved = state
                .remove_open_proposal(id)
                .ok_or(LedgerError::NotFound(id))?;
            resolved.reject()?;

            state.append_event(LedgerEvent::DebtRejected { id });

            Ok(())
        })?;

        info!(proposal = %id, caller = %caller, "Debt rejected");

        Ok(())
    }

    /// Settle what `caller` owes `creditor` in `asset`.
    ///
    /// The entry is zeroed *before* the external transfer is invoked, so a
    /// reentrant call from the transfer backend observes a zero balance and
    /// cannot re-settle. On transfer failure the amount is restored through
    /// the netting merge and no event is appended.
    ///
    /// # Errors
    /// - `NothingToSettle` if the entry is zero
    /// - `TransferFailed` if the backend reports failure (after rollback)
    pub async fn settle(
        &self,
        asset: &AssetId,
        caller: &AccountId,
        creditor: &AccountId,
    ) -> LedgerResult<TransferReceipt> {
        let debtor = caller;

        let amount = self.store.transact(|state| -> LedgerResult<Amount> {
            let owed = state.entry(asset, debtor, creditor);
            if owed.is_zero() {
                return Err(LedgerError::NothingToSettle {
                    asset: asset.clone(),
                    debtor: debtor.clone(),
                    creditor: creditor.clone(),
                });
            }

            // Zero before the transfer: a reentrant settle must find nothing
            state.set_entry(asset, debtor, creditor, Amount::ZERO);
            Ok(owed)
        })?;

        debug!(%debtor, %creditor, %asset, %amount, "Settlement transfer starting");

        match self.transfer.transfer(asset, debtor, creditor, amount).await {
            Ok(receipt) => {
                self.store.transact(|state| -> LedgerResult<()> {
                    state.append_event(LedgerEvent::DebtSettled {
                        debtor: debtor.clone(),
                        creditor: creditor.clone(),
                        asset: asset.clone(),
                        amount,
                    });
                    Ok(())
                })?;

                info!(
                    %debtor,
                    %creditor,
                    %asset,
                    %amount,
                    reference = %receipt.reference,
                    "Debt settled"
                );

                Ok(receipt)
            },
            Err(transfer_err) => {
                error!(
                    %debtor,
                    %creditor,
                    %asset,
                    %amount,
                    error = %transfer_err,
                    "Settlement transfer failed, rolling back"
                );

                // Restore through the netting merge so the invariant holds
                // even if an opposite debt landed while the transfer ran
                self.store.transact(|state| {
                    netting::merge_entry(state, asset, debtor, creditor, amount)
                })?;

                Err(LedgerError::TransferFailed(transfer_err))
            },
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tally_eventlog::EventQuery;
    use tally_transfer::StubTransfer;

    fn account(s: &str) -> AccountId {
        AccountId::new(s).unwrap()
    }

    fn usdc() -> AssetId {
        AssetId::new("USDC").unwrap()
    }

    fn create_test_ledger() -> (Ledger<StubTransfer>, Arc<MemoryStore>, Arc<StubTransfer>) {
        let store = Arc::new(MemoryStore::new());
        let transfer = Arc::new(StubTransfer::new());
        let ledger = Ledger::new(Arc::clone(&store), Arc::clone(&transfer));
        (ledger, store, transfer)
    }

    fn entry(store: &MemoryStore, debtor: &str, creditor: &str) -> u128 {
        store
            .snapshot(|state| state.entry(&usdc(), &account(debtor), &account(creditor)))
            .unwrap()
            .units()
    }

    fn event_types(store: &MemoryStore) -> Vec<&'static str> {
        store
            .snapshot(|state| state.log().records().iter().map(|r| r.event_type()).collect())
            .unwrap()
    }

    // Propose tests

    #[tokio::test]
    async fn test_propose_allocates_increasing_ids() {
        let (ledger, store, _) = create_test_ledger();

        let id1 = ledger
            .propose(&account("alice"), &account("bob"), &usdc(), Amount::new(100), "lunch")
            .await
            .unwrap();
        let id2 = ledger
            .propose(&account("alice"), &account("bob"), &usdc(), Amount::new(30), "coffee")
            .await
            .unwrap();

        assert_eq!(id1, ProposalId::new(1));
        assert_eq!(id2, ProposalId::new(2));

        // Both proposals open, nothing on the ledger yet
        let open = store.snapshot(|state| state.open_proposal_count()).unwrap();
        assert_eq!(open, 2);
        assert_eq!(entry(&store, "bob", "alice"), 0);
        assert_eq!(event_types(&store), vec!["debt_proposed", "debt_proposed"]);
    }

    #[tokio::test]
    async fn test_propose_rejects_self_proposal() {
        let (ledger, store, _) = create_test_ledger();

        let result = ledger
            .propose(&account("alice"), &account("alice"), &usdc(), Amount::new(100), "")
            .await;

        assert!(matches!(result, Err(LedgerError::InvalidOperands(_))));
        assert!(store.snapshot(|state| state.log().is_empty()).unwrap());
    }

    #[tokio::test]
    async fn test_propose_accepts_zero_amount() {
        // Positivity is deliberately deferred to confirmation
        let (ledger, store, _) = create_test_ledger();

        let id = ledger
            .propose(&account("alice"), &account("bob"), &usdc(), Amount::ZERO, "")
            .await
            .unwrap();

        assert!(store.snapshot(|state| state.is_open(id)).unwrap());
    }

    // Confirm tests

    #[tokio::test]
    async fn test_confirm_applies_debt_and_resolves_proposal() {
        let (ledger, store, _) = create_test_ledger();

        let id = ledger
            .propose(&account("alice"), &account("bob"), &usdc(), Amount::new(100), "lunch")
            .await
            .unwrap();

        let record = ledger.confirm(id, &account("bob")).await.unwrap();

        assert_eq!(entry(&store, "bob", "alice"), 100);
        assert!(!store.snapshot(|state| state.is_open(id)).unwrap());
        assert!(matches!(record.event, LedgerEvent::DebtAdded { .. }));

        // DebtAdded lands before DebtConfirmed
        assert_eq!(
            event_types(&store),
            vec!["debt_proposed", "debt_added", "debt_confirmed"]
        );
    }

    #[tokio::test]
    async fn test_confirm_requires_debtor() {
        let (ledger, store, _) = create_test_ledger();

        let id = ledger
            .propose(&account("alice"), &account("bob"), &usdc(), Amount::new(100), "")
            .await
            .unwrap();

        // The creditor cannot confirm their own claim
        let result = ledger.confirm(id, &account("alice")).await;
        assert!(matches!(result, Err(LedgerError::Unauthorized { .. })));

        // Neither can a third party
        let result = ledger.confirm(id, &account("carol")).await;
        assert!(matches!(result, Err(LedgerError::Unauthorized { .. })));

        // Ledger untouched, proposal still open
        assert_eq!(entry(&store, "bob", "alice"), 0);
        assert!(store.snapshot(|state| state.is_open(id)).unwrap());
    }

    #[tokio::test]
    async fn test_confirm_twice_fails_not_found() {
        let (ledger, store, _) = create_test_ledger();

        let id = ledger
            .propose(&account("alice"), &account("bob"), &usdc(), Amount::new(100), "")
            .await
            .unwrap();

        ledger.confirm(id, &account("bob")).await.unwrap();
        let result = ledger.confirm(id, &account("bob")).await;

        assert!(matches!(result, Err(LedgerError::NotFound(_))));
        // Applied exactly once
        assert_eq!(entry(&store, "bob", "alice"), 100);
    }

    #[tokio::test]
    async fn test_confirm_of_unknown_id_fails_not_found() {
        let (ledger, _, _) = create_test_ledger();
        let result = ledger.confirm(ProposalId::new(999), &account("bob")).await;
        assert!(matches!(result, Err(LedgerError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_zero_amount_proposal_fails_confirm_then_rejects() {
        let (ledger, store, _) = create_test_ledger();

        let id = ledger
            .propose(&account("alice"), &account("bob"), &usdc(), Amount::ZERO, "")
            .await
            .unwrap();

        // Confirmation trips the netting precondition; the proposal survives
        let result = ledger.confirm(id, &account("bob")).await;
        assert!(matches!(result, Err(LedgerError::InvalidOperands(_))));
        assert!(store.snapshot(|state| state.is_open(id)).unwrap());
        assert_eq!(event_types(&store), vec!["debt_proposed"]);

        // Rejection is the only viable resolution
        ledger.reject(id, &account("bob")).await.unwrap();
        assert!(!store.snapshot(|state| state.is_open(id)).unwrap());
    }

    #[tokio::test]
    async fn test_confirmed_debts_net_against_each_other() {
        let (ledger, store, _) = create_test_ledger();

        let id1 = ledger
            .propose(&account("alice"), &account("bob"), &usdc(), Amount::new(100), "")
            .await
            .unwrap();
        ledger.confirm(id1, &account("bob")).await.unwrap();

        let id2 = ledger
            .propose(&account("bob"), &account("alice"), &usdc(), Amount::new(30), "")
            .await
            .unwrap();
        ledger.confirm(id2, &account("alice")).await.unwrap();

        assert_eq!(entry(&store, "bob", "alice"), 70);
        assert_eq!(entry(&store, "alice", "bob"), 0);
    }

    // Reject tests

    #[tokio::test]
    async fn test_reject_by_either_party() {
        let (ledger, store, _) = create_test_ledger();

        let by_debtor = ledger
            .propose(&account("alice"), &account("bob"), &usdc(), Amount::new(100), "")
            .await
            .unwrap();
        ledger.reject(by_debtor, &account("bob")).await.unwrap();

        let by_creditor = ledger
            .propose(&account("alice"), &account("bob"), &usdc(), Amount::new(100), "")
            .await
            .unwrap();
        ledger.reject(by_creditor, &account("alice")).await.unwrap();

        assert_eq!(store.snapshot(|state| state.open_proposal_count()).unwrap(), 0);
        assert_eq!(entry(&store, "bob", "alice"), 0);
    }

    #[tokio::test]
    async fn test_reject_requires_a_party() {
        let (ledger, store, _) = create_test_ledger();

        let id = ledger
            .propose(&account("alice"), &account("bob"), &usdc(), Amount::new(100), "")
            .await
            .unwrap();

        let result = ledger.reject(id, &account("carol")).await;
        assert!(matches!(result, Err(LedgerError::Unauthorized { .. })));
        assert!(store.snapshot(|state| state.is_open(id)).unwrap());
    }

    #[tokio::test]
    async fn test_resolution_is_exclusive() {
        let (ledger, store, _) = create_test_ledger();

        let id = ledger
            .propose(&account("alice"), &account("bob"), &usdc(), Amount::new(100), "")
            .await
            .unwrap();

        ledger.reject(id, &account("alice")).await.unwrap();

        // Rejected proposals cannot be confirmed afterwards
        let result = ledger.confirm(id, &account("bob")).await;
        assert!(matches!(result, Err(LedgerError::NotFound(_))));
        assert_eq!(entry(&store, "bob", "alice"), 0);

        // And never re-rejected
        let result = ledger.reject(id, &account("bob")).await;
        assert!(matches!(result, Err(LedgerError::NotFound(_))));

        // Exactly one resolution event in the log
        let resolutions: Vec<_> = event_types(&store)
            .into_iter()
            .filter(|t| *t == "debt_confirmed" || *t == "debt_rejected")
            .collect();
        assert_eq!(resolutions, vec!["debt_rejected"]);
    }

    // Round-trip properties

    #[tokio::test]
    async fn test_propose_confirm_equals_direct_apply() {
        let (ledger, store, _) = create_test_ledger();

        let id = ledger
            .propose(&account("alice"), &account("bob"), &usdc(), Amount::new(100), "x")
            .await
            .unwrap();
        ledger.confirm(id, &account("bob")).await.unwrap();

        let mut direct = tally_store::LedgerState::new();
        netting::apply_debt(
            &mut direct,
            &usdc(),
            &account("bob"),
            &account("alice"),
            Amount::new(100),
            "x",
        )
        .unwrap();

        assert_eq!(
            entry(&store, "bob", "alice"),
            direct.entry(&usdc(), &account("bob"), &account("alice")).units()
        );
    }

    #[tokio::test]
    async fn test_propose_reject_leaves_balance_unchanged() {
        let (ledger, store, _) = create_test_ledger();

        let before = entry(&store, "bob", "alice");
        let id = ledger
            .propose(&account("alice"), &account("bob"), &usdc(), Amount::new(100), "")
            .await
            .unwrap();
        ledger.reject(id, &account("bob")).await.unwrap();

        assert_eq!(entry(&store, "bob", "alice"), before);
    }

    // Settlement tests

    async fn seed_confirmed_debt(
        ledger: &Ledger<StubTransfer>,
        creditor: &str,
        debtor: &str,
        amount: u128,
    ) {
        let id = ledger
            .propose(&account(creditor), &account(debtor), &usdc(), Amount::new(amount), "")
            .await
            .unwrap();
        ledger.confirm(id, &account(debtor)).await.unwrap();
    }

    #[tokio::test]
    async fn test_settle_zeroes_entry_and_emits_event() {
        let (ledger, store, transfer) = create_test_ledger();
        seed_confirmed_debt(&ledger, "alice", "bob", 50).await;

        let receipt = ledger
            .settle(&usdc(), &account("bob"), &account("alice"))
            .await
            .unwrap();

        assert_eq!(receipt.amount, Amount::new(50));
        assert_eq!(entry(&store, "bob", "alice"), 0);

        // Exactly one transfer, for exactly the settled amount
        let completed = transfer.completed();
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].amount, Amount::new(50));
        assert_eq!(completed[0].debtor, account("bob"));
        assert_eq!(completed[0].creditor, account("alice"));

        // Exactly one DebtSettled event
        let settled = store
            .snapshot(|state| {
                state
                    .log()
                    .query(&EventQuery::new().event_type("debt_settled"))
                    .len()
            })
            .unwrap();
        assert_eq!(settled, 1);
    }

    #[tokio::test]
    async fn test_settle_nothing_fails() {
        let (ledger, _, transfer) = create_test_ledger();

        let result = ledger.settle(&usdc(), &account("bob"), &account("alice")).await;

        assert!(matches!(result, Err(LedgerError::NothingToSettle { .. })));
        assert_eq!(transfer.completed_count(), 0);
    }

    #[tokio::test]
    async fn test_settle_is_idempotent_after_success() {
        let (ledger, _, transfer) = create_test_ledger();
        seed_confirmed_debt(&ledger, "alice", "bob", 50).await;

        ledger
            .settle(&usdc(), &account("bob"), &account("alice"))
            .await
            .unwrap();

        let result = ledger.settle(&usdc(), &account("bob"), &account("alice")).await;
        assert!(matches!(result, Err(LedgerError::NothingToSettle { .. })));
        assert_eq!(transfer.completed_count(), 1);
    }

    #[tokio::test]
    async fn test_settle_rolls_back_on_transfer_failure() {
        let (ledger, store, transfer) = create_test_ledger();
        seed_confirmed_debt(&ledger, "alice", "bob", 50).await;

        transfer.set_fail_next(true);
        let result = ledger.settle(&usdc(), &account("bob"), &account("alice")).await;

        assert!(matches!(result, Err(LedgerError::TransferFailed(_))));

        // Full rollback: balance restored, no DebtSettled event
        assert_eq!(entry(&store, "bob", "alice"), 50);
        let settled = store
            .snapshot(|state| {
                state
                    .log()
                    .query(&EventQuery::new().event_type("debt_settled"))
                    .len()
            })
            .unwrap();
        assert_eq!(settled, 0);

        // A retry succeeds and settles the restored amount
        let receipt = ledger
            .settle(&usdc(), &account("bob"), &account("alice"))
            .await
            .unwrap();
        assert_eq!(receipt.amount, Amount::new(50));
        assert_eq!(entry(&store, "bob", "alice"), 0);
    }

    // Reentrancy

    /// Transfer backend that re-enters the ledger mid-transfer, the way an
    /// external call could synchronously call back into the host.
    struct ReentrantTransfer {
        ledger: std::sync::OnceLock<Ledger<ReentrantTransfer>>,
        reentrant_result: std::sync::RwLock<Option<LedgerResult<TransferReceipt>>>,
    }

    #[async_trait::async_trait]
    impl TransferPort for ReentrantTransfer {
        async fn transfer(
            &self,
            asset: &AssetId,
            debtor: &AccountId,
            creditor: &AccountId,
            amount: Amount,
        ) -> Result<TransferReceipt, tally_transfer::TransferError> {
            let ledger = self.ledger.get().expect("ledger wired up");
            let inner = Box::pin(ledger.settle(asset, debtor, creditor)).await;
            *self.reentrant_result.write().unwrap() = Some(inner);

            Ok(TransferReceipt {
                reference: uuid::Uuid::now_v7().to_string(),
                asset: asset.clone(),
                debtor: debtor.clone(),
                creditor: creditor.clone(),
                amount,
                transferred_at: chrono::Utc::now(),
            })
        }

        async fn health_check(&self) -> Result<(), tally_transfer::TransferError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_reentrant_settle_observes_zero_balance() {
        let store = Arc::new(MemoryStore::new());
        let transfer = Arc::new(ReentrantTransfer {
            ledger: std::sync::OnceLock::new(),
            reentrant_result: std::sync::RwLock::new(None),
        });
        let ledger = Ledger::new(Arc::clone(&store), Arc::clone(&transfer));
        transfer
            .ledger
            .set(ledger.clone())
            .unwrap_or_else(|_| panic!("ledger already wired"));

        let id = ledger
            .propose(&account("alice"), &account("bob"), &usdc(), Amount::new(50), "")
            .await
            .unwrap();
        ledger.confirm(id, &account("bob")).await.unwrap();

        let receipt = ledger
            .settle(&usdc(), &account("bob"), &account("alice"))
            .await
            .unwrap();
        assert_eq!(receipt.amount, Amount::new(50));

        // The reentrant attempt found the entry already zeroed
        let inner = transfer.reentrant_result.read().unwrap();
        assert!(matches!(
            inner.as_ref().unwrap(),
            Err(LedgerError::NothingToSettle { .. })
        ));

        // Exactly one DebtSettled despite the reentrancy
        let settled = store
            .snapshot(|state| {
                state
                    .log()
                    .query(&EventQuery::new().event_type("debt_settled"))
                    .len()
            })
            .unwrap();
        assert_eq!(settled, 1);
    }
}
