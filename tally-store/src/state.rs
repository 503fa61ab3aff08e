//! Authoritative Ledger State
//!
//! One struct owns everything the ledger knows: the directed debt entries,
//! the open proposals with their by-pair index, the event log, and the
//! proposal id allocator. Keeping them together is what lets the store
//! commit a multi-collection mutation as a single atomic unit.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use tally_domain::{AccountId, Amount, AssetId, DebtProposal, LedgerEvent, ProposalId};
use tally_eventlog::{EventLog, EventRecord};

/// Key of a directed debt entry: who owes whom, in which asset
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
struct EntryKey {
    asset: AssetId,
    debtor: AccountId,
    creditor: AccountId,
}

/// Canonical (order-independent) key for a pair of accounts
fn pair_key(a: &AccountId, b: &AccountId) -> (AccountId, AccountId) {
    if a <= b {
        (a.clone(), b.clone())
    } else {
        (b.clone(), a.clone())
    }
}

/// The authoritative mapping `asset × debtor × creditor → amount`, plus the
/// open-proposal set and the event log.
///
/// Entries are created implicitly (a missing key reads as zero) and never
/// explicitly destroyed; an entry that returns to zero is dropped from the
/// map, which is observationally identical. The netting invariant (for any
/// `(asset, A, B)` at most one of the two directions is non-zero) is upheld
/// by the netting engine, the sole mutator of entries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LedgerState {
    /// Directed debt entries
    entries: HashMap<EntryKey, Amount>,
    /// Proposals still awaiting resolution, by id
    open_proposals: HashMap<ProposalId, DebtProposal>,
    /// Derived index: open proposal ids per unordered account pair.
    /// Maintained transactionally with `open_proposals`; results must be
    /// identical to a full event-log replay.
    open_by_pair: HashMap<(AccountId, AccountId), BTreeSet<ProposalId>>,
    /// The append-only event log
    log: EventLog,
    /// Last allocated proposal id (0 = none yet)
    last_proposal_id: u64,
}

impl LedgerState {
    /// Create an empty ledger state
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Directed debt entries
    // =========================================================================

    /// Current amount `debtor` owes `creditor` in `asset`; zero if absent
    pub fn entry(&self, asset: &AssetId, debtor: &AccountId, creditor: &AccountId) -> Amount {
        let key = EntryKey {
            asset: asset.clone(),
            debtor: debtor.clone(),
            creditor: creditor.clone(),
        };
        self.entries.get(&key).copied().unwrap_or(Amount::ZERO)
    }

    /// Set a directed entry; a zero amount removes the key
    pub fn set_entry(
        &mut self,
        asset: &AssetId,
        debtor: &AccountId,
        creditor: &AccountId,
        amount: Amount,
    ) {
        let key = EntryKey {
            asset: asset.clone(),
            debtor: debtor.clone(),
            creditor: creditor.clone(),
        };
        if amount.is_zero() {
            self.entries.remove(&key);
        } else {
            self.entries.insert(key, amount);
        }
    }

    /// Number of non-zero directed entries
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    // =========================================================================
    // Open proposals
    // =========================================================================

    /// Allocate the next proposal id
    ///
    /// Strictly monotonically increasing; must only be called inside the
    /// propose transaction so allocation commits with the proposal itself.
    pub fn allocate_proposal_id(&mut self) -> ProposalId {
        self.last_proposal_id += 1;
        ProposalId::new(self.last_proposal_id)
    }

    /// Insert an open proposal and index it by pair
    pub fn insert_open_proposal(&mut self, proposal: DebtProposal) {
        let key = pair_key(&proposal.creditor, &proposal.debtor);
        self.open_by_pair.entry(key).or_default().insert(proposal.id);
        self.open_proposals.insert(proposal.id, proposal);
    }

    /// Look up an open proposal by id
    pub fn open_proposal(&self, id: ProposalId) -> Option<&DebtProposal> {
        self.open_proposals.get(&id)
    }

    /// Check whether a proposal id is still open
    pub fn is_open(&self, id: ProposalId) -> bool {
        self.open_proposals.contains_key(&id)
    }

    /// Remove an open proposal, de-indexing it
    ///
    /// Returns `None` if the id is unknown or already resolved.
    pub fn remove_open_proposal(&mut self, id: ProposalId) -> Option<DebtProposal> {
        let proposal = self.open_proposals.remove(&id)?;
        let key = pair_key(&proposal.creditor, &proposal.debtor);
        if let Some(ids) = self.open_by_pair.get_mut(&key) {
            ids.remove(&id);
            if ids.is_empty() {
                self.open_by_pair.remove(&key);
            }
        }
        Some(proposal)
    }

    /// Open proposals between a pair (either direction), ascending by id
    pub fn open_proposals_between(&self, a: &AccountId, b: &AccountId) -> Vec<&DebtProposal> {
        let key = pair_key(a, b);
        match self.open_by_pair.get(&key) {
            Some(ids) => ids
                .iter()
                .filter_map(|id| self.open_proposals.get(id))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Number of open proposals
    pub fn open_proposal_count(&self) -> usize {
        self.open_proposals.len()
    }

    // =========================================================================
    // Event log
    // =========================================================================

    /// Read access to the event log
    pub fn log(&self) -> &EventLog {
        &self.log
    }

    /// The sequence number the next appended event will receive
    pub fn next_event_seq(&self) -> u64 {
        self.log.next_seq()
    }

    /// Append an event to the log
    pub fn append_event(&mut self, event: LedgerEvent) -> &EventRecord {
        self.log.append(event)
    }
}

// =============================================================================
// Tests
// =============================================================================
