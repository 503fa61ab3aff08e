//! Tally Projector
//!
//! The read side of the ledger: derives user-facing views from the event
//! log and current ledger state. Nothing here mutates anything.
//!
//! - `views` answers "who owes whom right now, and what is still pending"
//!   and produces the merged confirmed/pending history for a pair.
//! - `replay` independently folds the full event log back into balances and
//!   cross-checks the result against live state, so the derived indexes can
//!   be audited against the log at any time.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod replay;
pub mod views;

pub use error::{ProjectionError, Result};
pub use replay::{rebuild_pair, verify_pair, RebuiltPair};
pub use views::{pair_balance, pair_history, DirectionalAmounts, HistoryEntry, HistoryStatus, PairBalance};
