//! Ledger Events
//!
//! Events are the immutable lifecycle record of every proposal and every
//! ledger mutation. They are appended to the event log, never mutated or
//! removed, and replayed to reconstruct history and pending state.

use crate::value_objects::{AccountId, Amount, AssetId, ProposalId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Ledger events
///
/// Each variant records one state transition. Events can be serialized for
/// persistence and replayed to reconstruct balances and history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LedgerEvent {
    /// A debt was proposed and awaits the debtor's consent
    DebtProposed {
        /// Proposal identifier
        id: ProposalId,
        /// Account claiming to be owed
        creditor: AccountId,
        /// Account whose consent is required
        debtor: AccountId,
        /// Asset scoping the amount
        asset: AssetId,
        /// Proposed amount in smallest units
        amount: Amount,
        /// Free-form note from the proposer
        memo: String,
    },

    /// The debtor accepted a proposal
    DebtConfirmed {
        /// Identifier of the confirmed proposal
        id: ProposalId,
    },

    /// A party withdrew a proposal
    DebtRejected {
        /// Identifier of the rejected proposal
        id: ProposalId,
    },

    /// A debt was applied to the ledger through the netting engine
    ///
    /// `debtor`/`creditor` reflect the originally proposed direction, not
    /// the post-netting direction of the surviving entry.
    DebtAdded {
        /// Global event sequence number of this record
        sequence: u64,
        /// Debtor as originally proposed
        debtor: AccountId,
        /// Creditor as originally proposed
        creditor: AccountId,
        /// Asset scoping the amount
        asset: AssetId,
        /// Applied amount in smallest units
        amount: Amount,
        /// Note carried from the proposal (or direct addition)
        memo: String,
        /// When the debt was applied
        timestamp: DateTime<Utc>,
    },

    /// A ledger entry was settled by an external value transfer
    DebtSettled {
        /// Account that paid
        debtor: AccountId,
        /// Account that was paid
        creditor: AccountId,
        /// Asset that was transferred
        asset: AssetId,
        /// Amount transferred, equal to the entry at settlement time
        amount: Amount,
    },
}

impl LedgerEvent {
    /// Get the event type name
    pub fn event_type(&self) -> &'static str {
        match self {
            LedgerEvent::DebtProposed { .. } => "debt_proposed",
            LedgerEvent::DebtConfirmed { .. } => "debt_confirmed",
            LedgerEvent::DebtRejected { .. } => "debt_rejected",
            LedgerEvent::DebtAdded { .. } => "debt_added",
            LedgerEvent::DebtSettled { .. } => "debt_settled",
        }
    }

    /// Get the proposal id this event references, if any
    ///
    /// `DebtAdded` and `DebtSettled` record ledger mutations rather than
    /// proposal lifecycle steps, so they carry no proposal id.
    pub fn proposal_id(&self) -> Option<ProposalId> {
        match self {
            LedgerEvent::DebtProposed { id, .. }
            | LedgerEvent::DebtConfirmed { id }
            | LedgerEvent::DebtRejected { id } => Some(*id),
            LedgerEvent::DebtAdded { .. } | LedgerEvent::DebtSettled { .. } => None,
        }
    }

    /// Get the asset this event is scoped to, if it carries one
    pub fn asset(&self) -> Option<&AssetId> {
        match self {
            LedgerEvent::DebtProposed { asset, .. }
            | LedgerEvent::DebtAdded { asset, .. }
            | LedgerEvent::DebtSettled { asset, .. } => Some(asset),
            LedgerEvent::DebtConfirmed { .. } | LedgerEvent::DebtRejected { .. } => None,
        }
    }

    /// Get the (debtor, creditor) accounts this event names, if any
    pub fn parties(&self) -> Option<(&AccountId, &AccountId)> {
        match self {
            LedgerEvent::DebtProposed {
                debtor, creditor, ..
            }
            | LedgerEvent::DebtAdded {
                debtor, creditor, ..
            }
            | LedgerEvent::DebtSettled {
                debtor, creditor, ..
            } => Some((debtor, creditor)),
            LedgerEvent::DebtConfirmed { .. } | LedgerEvent::DebtRejected { .. } => None,
        }
    }

    /// Check whether this event names the given pair, either direction
    ///
    /// Resolution events (`DebtConfirmed`/`DebtRejected`) name no accounts
    /// and always return false; correlate them through `proposal_id`.
    pub fn is_between(&self, a: &AccountId, b: &AccountId) -> bool {
        match self.parties() {
            Some((debtor, creditor)) => {
                (debtor == a && creditor == b) || (debtor == b && creditor == a)
            },
            None => false,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
