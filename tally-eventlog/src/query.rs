//! Event Querying

use tally_domain::{AccountId, AssetId, ProposalId};

use crate::record::EventRecord;

/// Query options for reading events
///
/// Filters compose with AND semantics. Events that do not carry the filtered
/// attribute (e.g. resolution events carry no pair) are excluded by that
/// filter; callers correlating resolutions to proposals should filter by
/// `proposal_id` instead.
#[derive(Debug, Clone, Default)]
pub struct EventQuery {
    /// Restrict to events naming this pair (either direction)
    pub pair: Option<(AccountId, AccountId)>,

    /// Restrict to events scoped to this asset
    pub asset: Option<AssetId>,

    /// Restrict to events referencing this proposal id
    pub proposal_id: Option<ProposalId>,

    /// Restrict to one event type (e.g. "debt_added")
    pub event_type: Option<&'static str>,

    /// Start sequence number (inclusive)
    pub from_seq: Option<u64>,

    /// End sequence number (exclusive)
    pub to_seq: Option<u64>,

    /// Limit results
    pub limit: Option<usize>,
}

impl EventQuery {
    /// Create an empty query matching every record
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter by pair, either direction
    pub fn pair(mut self, a: AccountId, b: AccountId) -> Self {
        self.pair = Some((a, b));
        self
    }

    /// Filter by asset
    pub fn asset(mut self, asset: AssetId) -> Self {
        self.asset = Some(asset);
        self
    }

    /// Filter by proposal id
    pub fn proposal(mut self, id: ProposalId) -> Self {
        self.proposal_id = Some(id);
        self
    }

    /// Filter by event type name
    pub fn event_type(mut self, event_type: &'static str) -> Self {
        self.event_type = Some(event_type);
        self
    }

    /// Filter by sequence range: `from` inclusive, `to` exclusive
    pub fn seq_range(mut self, from: u64, to: u64) -> Self {
        self.from_seq = Some(from);
        self.to_seq = Some(to);
        self
    }

    /// Limit results
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Check whether a record matches every set filter
    pub fn matches(&self, record: &EventRecord) -> bool {
        if let Some((ref a, ref b)) = self.pair {
            if !record.event.is_between(a, b) {
                return false;
            }
        }

        if let Some(ref asset) = self.asset {
            if record.event.asset() != Some(asset) {
                return false;
            }
        }

        if let Some(id) = self.proposal_id {
            if record.event.proposal_id() != Some(id) {
                return false;
            }
        }

        if let Some(event_type) = self.event_type {
            if record.event_type() != event_type {
                return false;
            }
        }

        if let Some(from) = self.from_seq {
            if record.seq < from {
                return false;
            }
        }

        if let Some(to) = self.to_seq {
            if record.seq >= to {
                return false;
            }
        }

        true
    }
}

// =============================================================================
// Tests
// =============================================================================
