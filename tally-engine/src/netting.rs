//! Netting Engine
//!
//! Applies a new directed debt to the ledger, automatically offsetting any
//! amount owed in the opposite direction so that, per (asset, pair), at most
//! one direction ever holds a non-zero balance.
//!
//! This is a pure state transition: no I/O, no external calls, directly
//! testable against a bare [`LedgerState`].

use chrono::Utc;
use tracing::debug;

use tally_domain::{AccountId, Amount, AssetId, LedgerEvent};
use tally_eventlog::EventRecord;
use tally_store::LedgerState;

use crate::error::{LedgerError, LedgerResult};

/// Apply a directed debt, netting it against the opposite entry.
///
/// Let `opposite` be what `creditor` currently owes `debtor`:
/// - if `opposite >= amount`, the debt only reduces `opposite`;
/// - otherwise `opposite` goes to zero and the remainder accrues on what
///   `debtor` owes `creditor`.
///
/// The collapse to a single net signed balance makes the algorithm
/// commutative in net effect over any sequence of debts between a pair.
/// Debts must still be applied one at a time, never reordered or batched,
/// because each may originate from an independently rejectable proposal.
///
/// Appends a `DebtAdded` event recording the *originally proposed*
/// direction (not the post-netting direction) and returns its record.
///
/// # Errors
/// - `InvalidOperands` if `debtor == creditor` or `amount` is zero
/// - `Overflow` if the surviving entry would exceed the representable range
///
/// All failures leave the state untouched.
pub fn apply_debt(
    state: &mut LedgerState,
    asset: &AssetId,
    debtor: &AccountId,
    creditor: &AccountId,
    amount: Amount,
    memo: &str,
) -> LedgerResult<EventRecord> {
    if debtor == creditor {
        return Err(LedgerError::InvalidOperands(format!(
            "Debtor and creditor must differ, got {} for both",
            debtor
        )));
    }
    if amount.is_zero() {
        return Err(LedgerError::InvalidOperands(
            "Debt amount must be positive".to_string(),
        ));
    }

    merge_entry(state, asset, debtor, creditor, amount)?;

    let event = LedgerEvent::DebtAdded {
        sequence: state.next_event_seq(),
        debtor: debtor.clone(),
        creditor: creditor.clone(),
        asset: asset.clone(),
        amount,
        memo: memo.to_string(),
        timestamp: Utc::now(),
    };

    let record = state.append_event(event).clone();

    debug!(
        seq = record.seq,
        %debtor,
        %creditor,
        %asset,
        %amount,
        "Debt applied"
    );

    Ok(record)
}

/// The netting arithmetic alone: fold `amount` owed `debtor → creditor`
/// into the entry pair, offsetting the opposite direction first.
///
/// Emits no event. Settlement rollback reuses this so a restored amount
/// re-nets against whatever the entries hold, keeping the netting invariant
/// unconditional.
///
/// Validates nothing and mutates nothing until the arithmetic is known to
/// fit; an `Overflow` return leaves both entries unchanged.
pub(crate) fn merge_entry(
    state: &mut LedgerState,
    asset: &AssetId,
    debtor: &AccountId,
    creditor: &AccountId,
    amount: Amount,
) -> LedgerResult<()> {
    let opposite = state.entry(asset, creditor, debtor);

    if opposite >= amount {
        state.set_entry(asset, creditor, debtor, opposite.saturating_sub(amount));
        return Ok(());
    }

    let forward = state.entry(asset, debtor, creditor);
    let increase = amount.saturating_sub(opposite);
    let new_forward = forward.checked_add(increase).ok_or_else(|| {
        LedgerError::Overflow(format!(
            "Entry {} -> {} in {} cannot absorb {} more units",
            debtor, creditor, asset, increase
        ))
    })?;

    state.set_entry(asset, creditor, debtor, Amount::ZERO);
    state.set_entry(asset, debtor, creditor, new_forward);
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
