//! Event Record Envelope

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tally_domain::LedgerEvent;

/// Event with its position in the global order
///
/// `seq` is strictly increasing across all assets and pairs and is assigned
/// by the log at append time, inside the same atomic unit as the state
/// mutation the event describes. Records are never mutated or removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Global sequence number, starting at 1
    pub seq: u64,
    /// When the record was appended
    pub recorded_at: DateTime<Utc>,
    /// The event itself
    pub event: LedgerEvent,
}

impl EventRecord {
    /// Get the event type name of the wrapped event
    pub fn event_type(&self) -> &'static str {
        self.event.event_type()
    }
}

// =============================================================================
// Tests
// =============================================================================
