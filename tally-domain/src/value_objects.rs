//! Value Objects for the Tally Domain
//!
//! Immutable, validated domain primitives.
//! All value objects enforce invariants at construction time.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Domain errors for value object validation and state transitions
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// Account identifier must be non-empty
    #[error("Invalid account id: {0}")]
    InvalidAccountId(String),

    /// Asset identifier must be non-empty
    #[error("Invalid asset id: {0}")]
    InvalidAssetId(String),

    /// Invalid proposal state transition
    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(String),
}

// =============================================================================
// AccountId
// =============================================================================

/// AccountId is an opaque handle for a ledger participant.
///
/// The core never inspects the content; host environments typically use
/// wallet addresses. Two accounts are the same participant iff their
/// identifiers are equal.
///
/// # Invariants
/// - Must be non-empty
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AccountId(String);

impl AccountId {
    /// Create a new AccountId with validation
    ///
    /// # Errors
    /// Returns `DomainError::InvalidAccountId` if the identifier is empty.
    pub fn new(id: impl Into<String>) -> Result<Self, DomainError> {
        let id = id.into();
        if id.is_empty() {
            return Err(DomainError::InvalidAccountId(
                "Account id must be non-empty".to_string(),
            ));
        }
        Ok(Self(id))
    }

    /// Get the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// AssetId
// =============================================================================

/// AssetId is an opaque handle scoping all amounts.
///
/// Typically a token/contract address. Amounts for different assets are
/// never comparable or combinable.
///
/// # Invariants
/// - Must be non-empty
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AssetId(String);

impl AssetId {
    /// Create a new AssetId with validation
    ///
    /// # Errors
    /// Returns `DomainError::InvalidAssetId` if the identifier is empty.
    pub fn new(id: impl Into<String>) -> Result<Self, DomainError> {
        let id = id.into();
        if id.is_empty() {
            return Err(DomainError::InvalidAssetId(
                "Asset id must be non-empty".to_string(),
            ));
        }
        Ok(Self(id))
    }

    /// Get the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Amount
// =============================================================================

/// Amount is a quantity in an asset's smallest unit.
///
/// Amounts are plain unsigned integers; no decimal semantics exist anywhere
/// in the core. All arithmetic is checked so an overflow surfaces as an
/// error instead of wrapping.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Amount(u128);

impl Amount {
    /// The zero amount (ledger entries rest at zero)
    pub const ZERO: Amount = Amount(0);

    /// Create an Amount from smallest units
    pub fn new(units: u128) -> Self {
        Self(units)
    }

    /// Get the underlying unit count
    pub fn units(&self) -> u128 {
        self.0
    }

    /// Check whether this amount is zero
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checked addition; `None` on overflow
    pub fn checked_add(self, other: Amount) -> Option<Amount> {
        self.0.checked_add(other.0).map(Amount)
    }

    /// Checked subtraction; `None` if `other > self`
    pub fn checked_sub(self, other: Amount) -> Option<Amount> {
        self.0.checked_sub(other.0).map(Amount)
    }

    /// Saturating subtraction; floors at zero
    pub fn saturating_sub(self, other: Amount) -> Amount {
        Amount(self.0.saturating_sub(other.0))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u128> for Amount {
    fn from(units: u128) -> Self {
        Self(units)
    }
}

// =============================================================================
// ProposalId
// =============================================================================

/// ProposalId is the monotonically increasing identifier of a debt proposal.
///
/// Ids are allocated solely by the proposal store inside the propose
/// transaction; a resolved proposal's id remains forever valid as a lookup
/// key into the event log.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ProposalId(u64);

impl ProposalId {
    /// Create a ProposalId from its numeric value
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Get the numeric value
    pub fn value(&self) -> u64 {
        self.0
    }

    /// The id that follows this one
    pub fn next(&self) -> ProposalId {
        ProposalId(self.0 + 1)
    }
}

impl fmt::Display for ProposalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // AccountId tests
    #[test]
    fn test_account_id_validation() {
        assert!(AccountId::new("0xabc123").is_ok());
        assert!(AccountId::new("alice").is_ok());
        assert!(AccountId::new("").is_err());
    }

    #[test]
    fn test_account_id_display() {
        let id = AccountId::new("0xabc123").unwrap();
        assert_eq!(id.as_str(), "0xabc123");
        assert_eq!(id.to_string(), "0xabc123");
    }

    // AssetId tests
    #[test]
    fn test_asset_id_validation() {
        assert!(AssetId::new("0xdeadbeef").is_ok());
        assert!(AssetId::new("").is_err());
    }

    // Amount tests
    #[test]
    fn test_amount_zero() {
        assert!(Amount::ZERO.is_zero());
        assert!(!Amount::new(1).is_zero());
        assert_eq!(Amount::default(), Amount::ZERO);
    }

    #[test]
    fn test_amount_checked_add() {
        let a = Amount::new(100);
        let b = Amount::new(20);
        assert_eq!(a.checked_add(b), Some(Amount::new(120)));

        let max = Amount::new(u128::MAX);
        assert_eq!(max.checked_add(Amount::new(1)), None);
    }

    #[test]
    fn test_amount_checked_sub() {
        let a = Amount::new(100);
        assert_eq!(a.checked_sub(Amount::new(20)), Some(Amount::new(80)));
        assert_eq!(Amount::new(20).checked_sub(a), None);
    }

    #[test]
    fn test_amount_saturating_sub() {
        assert_eq!(
            Amount::new(20).saturating_sub(Amount::new(100)),
            Amount::ZERO
        );
        assert_eq!(
            Amount::new(100).saturating_sub(Amount::new(20)),
            Amount::new(80)
        );
    }

    #[test]
    fn test_amount_ordering() {
        assert!(Amount::new(100) > Amount::new(20));
        assert!(Amount::ZERO < Amount::new(1));
    }

    #[test]
    fn test_amount_serde_transparent() {
        let amount = Amount::new(12345);
        let json = serde_json::to_string(&amount).unwrap();
        assert_eq!(json, "12345");

        let parsed: Amount = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, amount);
    }

    // ProposalId tests
    #[test]
    fn test_proposal_id_next() {
        let id = ProposalId::new(7);
        assert_eq!(id.next(), ProposalId::new(8));
        assert_eq!(id.value(), 7);
    }

    #[test]
    fn test_proposal_id_display() {
        assert_eq!(ProposalId::new(42).to_string(), "#42");
    }
}
