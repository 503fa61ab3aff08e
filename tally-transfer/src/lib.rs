//! Tally Transfer Layer
//!
//! Port definition for the value-transfer backend invoked by settlement,
//! plus a stub implementation for tests. The backend is an external
//! collaborator: the core only requires that a transfer be invoked
//! synchronously within the settlement transaction and that failure be
//! distinguishable from success.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod ports;
pub mod stub;

pub use error::TransferError;
pub use ports::{TransferPort, TransferReceipt};
pub use stub::StubTransfer;
