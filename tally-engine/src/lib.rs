//! Tally Engine
//!
//! The write side of the debt ledger: the netting engine that collapses
//! bidirectional obligations into a single directed balance, the
//! propose → confirm/reject state machine gating every mutation on the
//! debtor's consent, and the settlement operation that zeroes a balance
//! against an external value transfer.
//!
//! Every operation is an atomic, all-or-nothing transaction against the
//! store; either the ledger entries, proposal set, and event log move in
//! lockstep, or none of them move at all.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod ledger;
pub mod netting;

pub use error::{LedgerError, LedgerResult};
pub use ledger::Ledger;
pub use netting::apply_debt;
