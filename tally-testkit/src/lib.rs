//! Test helpers for Tally ledger tests.
//!
//! Provides fixture construction for a stub-backed ledger, literal helpers
//! for accounts/assets/amounts, and seeding for common scenarios.

mod helpers;

pub use helpers::{account, amount, asset, test_ledger, TestLedger};
