//! Balance and history views
//!
//! Confirmed figures read directly from the ledger entries; pending figures
//! fold the open-proposal-by-pair index, which is maintained transactionally
//! with the event log and therefore produces results identical to a full
//! log replay (the `replay` module verifies exactly that).

use serde::{Deserialize, Serialize};

use chrono::{DateTime, Utc};
use tally_domain::{AccountId, Amount, AssetId, LedgerEvent};
use tally_store::{LedgerState, MemoryStore};

use crate::error::{ProjectionError, Result};

// =============================================================================
// Balance view
// =============================================================================

/// Amounts owed in each direction between a pair
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectionalAmounts {
    /// What A owes B
    pub a_owes_b: Amount,
    /// What B owes A
    pub b_owes_a: Amount,
}

/// Balance view for a pair and asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairBalance {
    /// Debts the debtor has confirmed, as held in the ledger entries
    pub confirmed: DirectionalAmounts,
    /// Proposals still awaiting the debtor's decision
    pub pending: DirectionalAmounts,
}

/// Current confirmed and pending balances between `a` and `b` in `asset`.
///
/// Confirmed reads are O(1) against the ledger entries. Pending totals fold
/// the open proposals for the pair.
pub fn pair_balance(
    store: &MemoryStore,
    asset: &AssetId,
    a: &AccountId,
    b: &AccountId,
) -> Result<PairBalance> {
    store.snapshot(|state| {
        let confirmed = DirectionalAmounts {
            a_owes_b: state.entry(asset, a, b),
            b_owes_a: state.entry(asset, b, a),
        };
        let pending = pending_between(state, asset, a, b)?;

        Ok(PairBalance { confirmed, pending })
    })?
}

/// Fold the open proposals between a pair into pending directional totals.
pub(crate) fn pending_between(
    state: &LedgerState,
    asset: &AssetId,
    a: &AccountId,
    b: &AccountId,
) -> Result<DirectionalAmounts> {
    let mut pending = DirectionalAmounts::default();

    for proposal in state.open_proposals_between(a, b) {
        if &proposal.asset != asset {
            continue;
        }

        let slot = if &proposal.debtor == a {
            &mut pending.a_owes_b
        } else {
            &mut pending.b_owes_a
        };
        *slot = slot.checked_add(proposal.amount).ok_or_else(|| {
            ProjectionError::Overflow(format!(
                "Pending total between {} and {} in {} overflowed",
                a, b, asset
            ))
        })?;
    }

    Ok(pending)
}

// =============================================================================
// History view
// =============================================================================

/// Resolution state of a history row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryStatus {
    /// The debt was confirmed and applied to the ledger
    Confirmed,
    /// The proposal is still awaiting the debtor's decision
    Pending,
}

/// One row of a pair's transaction history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Global event sequence of the underlying record
    pub seq: u64,
    /// When the debt was applied (confirmed) or proposed (pending)
    pub timestamp: DateTime<Utc>,
    /// Asset the amount is scoped to
    pub asset: AssetId,
    /// Debtor in the originally proposed direction
    pub debtor: AccountId,
    /// Creditor in the originally proposed direction
    pub creditor: AccountId,
    /// Amount in the asset's smallest unit
    pub amount: Amount,
    /// Note attached by the proposer
    pub memo: String,
    /// Whether the row is confirmed or still pending
    pub status: HistoryStatus,
}

/// Chronological history between `a` and `b`, ascending by sequence.
///
/// Merges confirmed `DebtAdded` records with still-open `DebtProposed`
/// records. `asset = None` aggregates across all assets; each row carries
/// its own asset so mixed-asset timelines stay unambiguous. Rejected
/// proposals do not appear; their trail remains in the event log, reachable
/// by proposal id.
pub fn pair_history(
    store: &MemoryStore,
    asset: Option<&AssetId>,
    a: &AccountId,
    b: &AccountId,
) -> Result<Vec<HistoryEntry>> {
    store.snapshot(|state| {
        let mut entries = Vec::new();

        for record in state.log().records() {
            match &record.event {
                LedgerEvent::DebtAdded {
                    sequence,
                    debtor,
                    creditor,
                    asset: event_asset,
                    amount,
                    memo,
                    timestamp,
                } => {
                    if !record.event.is_between(a, b) {
                        continue;
                    }
                    if asset.is_some_and(|wanted| wanted != event_asset) {
                        continue;
                    }
                    entries.push(HistoryEntry {
                        seq: *sequence,
                        timestamp: *timestamp,
                        asset: event_asset.clone(),
                        debtor: debtor.clone(),
                        creditor: creditor.clone(),
                        amount: *amount,
                        memo: memo.clone(),
                        status: HistoryStatus::Confirmed,
                    });
                },
                LedgerEvent::DebtProposed {
                    id,
                    creditor,
                    debtor,
                    asset: event_asset,
                    amount,
                    memo,
                } => {
                    if !record.event.is_between(a, b) {
                        continue;
                    }
                    if asset.is_some_and(|wanted| wanted != event_asset) {
                        continue;
                    }
                    // Only unresolved proposals contribute a pending row
                    if !state.is_open(*id) {
                        continue;
                    }
                    entries.push(HistoryEntry {
                        seq: record.seq,
                        timestamp: record.recorded_at,
                        asset: event_asset.clone(),
                        debtor: debtor.clone(),
                        creditor: creditor.clone(),
                        amount: *amount,
                        memo: memo.clone(),
                        status: HistoryStatus::Pending,
                    });
                },
                _ => {},
            }
        }

        // The log walk is already ascending by record seq
        Ok(entries)
    })?
}

// =============================================================================
// Tests
// =============================================================================
