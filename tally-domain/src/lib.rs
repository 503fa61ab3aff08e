//! Tally Domain Layer
//!
//! Pure domain logic with zero I/O dependencies.
//! Contains value objects, the debt proposal entity, and ledger events.

#![warn(missing_docs)]
#![warn(clippy::all)]

// Public modules
pub mod events;
pub mod proposal;
pub mod value_objects;

// Re-export commonly used types
pub use events::LedgerEvent;
pub use proposal::{DebtProposal, ProposalStatus};
pub use value_objects::{AccountId, Amount, AssetId, DomainError, ProposalId};
