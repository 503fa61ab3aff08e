//! Tally Event Log
//!
//! Append-only, totally ordered record of every proposal, confirmation,
//! rejection, net-adjustment, and settlement. The log is the sole source of
//! historical truth: balances can always be rebuilt by replaying it.
//!
//! The log itself is a plain data structure; atomicity with the rest of the
//! ledger state comes from embedding it in the store's single transaction
//! boundary.
//!
//! # Usage
//!
//! ```rust
//! use tally_domain::{AccountId, Amount, AssetId, LedgerEvent, ProposalId};
//! use tally_eventlog::{EventLog, EventQuery};
//!
//! let mut log = EventLog::new();
//! log.append(LedgerEvent::DebtProposed {
//!     id: ProposalId::new(1),
//!     creditor: AccountId::new("alice").unwrap(),
//!     debtor: AccountId::new("bob").unwrap(),
//!     asset: AssetId::new("USDC").unwrap(),
//!     amount: Amount::new(100),
//!     memo: "lunch".to_string(),
//! });
//!
//! let records = log.query(&EventQuery::new().event_type("debt_proposed"));
//! assert_eq!(records.len(), 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod log;
pub mod query;
pub mod record;

pub use log::EventLog;
pub use query::EventQuery;
pub use record::EventRecord;
