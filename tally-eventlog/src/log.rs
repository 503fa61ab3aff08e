//! Append-Only Event Log

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tally_domain::LedgerEvent;
use tracing::debug;

use crate::query::EventQuery;
use crate::record::EventRecord;

/// Append-only, globally sequenced event log
///
/// Sequence numbers start at 1 and increase by exactly one per append, with
/// no gaps. The log never forgets: records are immutable once appended.
///
/// For events that embed their own sequence number (`DebtAdded`), callers
/// read `next_seq()` first, build the event with it, and append; the log
/// assigns that same number.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventLog {
    records: Vec<EventRecord>,
}

impl EventLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// The sequence number the next appended record will receive
    pub fn next_seq(&self) -> u64 {
        self.records.len() as u64 + 1
    }

    /// Append an event, assigning it the next sequence number
    pub fn append(&mut self, event: LedgerEvent) -> &EventRecord {
        let record = EventRecord {
            seq: self.next_seq(),
            recorded_at: Utc::now(),
            event,
        };

        debug!(
            seq = record.seq,
            event_type = record.event_type(),
            "Event appended"
        );

        self.records.push(record);
        self.records.last().expect("record was just pushed")
    }

    /// Number of records in the log
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check whether the log is empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records in append order
    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    /// Look up a record by its sequence number
    pub fn get(&self, seq: u64) -> Option<&EventRecord> {
        if seq == 0 {
            return None;
        }
        self.records.get(seq as usize - 1)
    }

    /// Records matching a query, in ascending sequence order
    pub fn query(&self, query: &EventQuery) -> Vec<&EventRecord> {
        let iter = self.records.iter().filter(|r| query.matches(r));
        match query.limit {
            Some(limit) => iter.take(limit).collect(),
            None => iter.collect(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
