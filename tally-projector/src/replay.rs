//! Event log replay and live-state verification
//!
//! The event log is the sole source of historical truth: folding it from
//! the beginning must land on exactly the balances the ledger entries and
//! open-proposal set hold right now. `rebuild_pair` performs that fold with
//! its own arithmetic, deliberately independent of the engine's netting
//! code, and `verify_pair` turns any disagreement into an error.

use std::collections::HashMap;

use tally_domain::{AccountId, AssetId, LedgerEvent, ProposalId};
use tally_eventlog::EventLog;
use tally_store::MemoryStore;
use tracing::warn;

use crate::error::{ProjectionError, Result};
use crate::views::{pending_between, DirectionalAmounts};

/// Balances reconstructed purely from the event log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RebuiltPair {
    /// Confirmed balances, as the log implies them
    pub confirmed: DirectionalAmounts,
    /// Pending balances from proposals the log never saw resolved
    pub pending: DirectionalAmounts,
}

/// Fold the full event log into the balances for one pair and asset.
///
/// Confirmed figures are the signed sum of all `DebtAdded` netting
/// contributions minus all `DebtSettled` amounts, collapsed to a single
/// direction at every step. Pending figures come from `DebtProposed`
/// records with no matching `DebtConfirmed`/`DebtRejected`.
pub fn rebuild_pair(
    log: &EventLog,
    asset: &AssetId,
    a: &AccountId,
    b: &AccountId,
) -> Result<RebuiltPair> {
    // Net confirmed balance, tracked one direction at a time
    let mut a_owes_b: u128 = 0;
    let mut b_owes_a: u128 = 0;
    // Unresolved proposals: id -> (debtor is `a`, units)
    let mut open: HashMap<ProposalId, (bool, u128)> = HashMap::new();

    for record in log.records() {
        match &record.event {
            LedgerEvent::DebtProposed {
                id,
                debtor,
                asset: event_asset,
                amount,
                ..
            } => {
                if record.event.is_between(a, b) && event_asset == asset {
                    open.insert(*id, (debtor == a, amount.units()));
                }
            },

            LedgerEvent::DebtConfirmed { id } | LedgerEvent::DebtRejected { id } => {
                // Unconditional: ids from other pairs were never inserted
                open.remove(id);
            },

            LedgerEvent::DebtAdded {
                debtor,
                asset: event_asset,
                amount,
                ..
            } => {
                if !record.event.is_between(a, b) || event_asset != asset {
                    continue;
                }
                let units = amount.units();
                if debtor == a {
                    let offset = b_owes_a.min(units);
                    b_owes_a -= offset;
                    a_owes_b = a_owes_b.checked_add(units - offset).ok_or_else(|| {
                        overflow(a, b, asset)
                    })?;
                } else {
                    let offset = a_owes_b.min(units);
                    a_owes_b -= offset;
                    b_owes_a = b_owes_a.checked_add(units - offset).ok_or_else(|| {
                        overflow(a, b, asset)
                    })?;
                }
            },

            LedgerEvent::DebtSettled {
                debtor,
                asset: event_asset,
                amount,
                ..
            } => {
                if !record.event.is_between(a, b) || event_asset != asset {
                    continue;
                }
                if debtor == a {
                    a_owes_b = a_owes_b.saturating_sub(amount.units());
                } else {
                    b_owes_a = b_owes_a.saturating_sub(amount.units());
                }
            },
        }
    }

    let mut pending = DirectionalAmounts::default();
    for (debtor_is_a, units) in open.values() {
        let slot = if *debtor_is_a {
            &mut pending.a_owes_b
        } else {
            &mut pending.b_owes_a
        };
        *slot = slot
            .checked_add(tally_domain::Amount::new(*units))
            .ok_or_else(|| overflow(a, b, asset))?;
    }

    Ok(RebuiltPair {
        confirmed: DirectionalAmounts {
            a_owes_b: tally_domain::Amount::new(a_owes_b),
            b_owes_a: tally_domain::Amount::new(b_owes_a),
        },
        pending,
    })
}

/// Replay the log for a pair and cross-check against live state.
///
/// # Errors
/// Returns `ProjectionError::Divergence` if the reconstructed confirmed or
/// pending balances differ from the ledger entries and open-proposal index.
pub fn verify_pair(
    store: &MemoryStore,
    asset: &AssetId,
    a: &AccountId,
    b: &AccountId,
) -> Result<RebuiltPair> {
    store.snapshot(|state| {
        let rebuilt = rebuild_pair(state.log(), asset, a, b)?;

        let live_confirmed = DirectionalAmounts {
            a_owes_b: state.entry(asset, a, b),
            b_owes_a: state.entry(asset, b, a),
        };
        if rebuilt.confirmed != live_confirmed {
            warn!(%a, %b, %asset, "Replay diverged from ledger entries");
            return Err(ProjectionError::Divergence {
                detail: format!(
                    "Confirmed balance for ({}, {}) in {}: replay {:?}, live {:?}",
                    a, b, asset, rebuilt.confirmed, live_confirmed
                ),
            });
        }

        let live_pending = pending_between(state, asset, a, b)?;
        if rebuilt.pending != live_pending {
            warn!(%a, %b, %asset, "Replay diverged from open-proposal index");
            return Err(ProjectionError::Divergence {
                detail: format!(
                    "Pending balance for ({}, {}) in {}: replay {:?}, live {:?}",
                    a, b, asset, rebuilt.pending, live_pending
                ),
            });
        }

        Ok(rebuilt)
    })?
}

fn overflow(a: &AccountId, b: &AccountId, asset: &AssetId) -> ProjectionError {
    ProjectionError::Overflow(format!(
        "Replay total between {} and {} in {} overflowed",
        a, b, asset
    ))
}

// =============================================================================
// Tests
// =============================================================================
