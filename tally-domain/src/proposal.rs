//! Debt Proposal Entity
//!
//! A proposal is a debt awaiting the debtor's consent. It is the only way a
//! counterparty can put an obligation on someone else's side of the ledger.

use crate::value_objects::{AccountId, Amount, AssetId, DomainError, ProposalId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// ProposalStatus
// =============================================================================

/// Lifecycle status of a debt proposal
///
/// `Open → {Confirmed, Rejected}`; both resolutions are terminal and a
/// proposal resolves at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalStatus {
    /// Awaiting the debtor's decision
    Open,
    /// Debtor accepted; the debt has been applied to the ledger
    Confirmed,
    /// Creditor or debtor withdrew it; the ledger is untouched
    Rejected,
}

impl ProposalStatus {
    /// Get the status name
    pub fn name(&self) -> &'static str {
        match self {
            ProposalStatus::Open => "open",
            ProposalStatus::Confirmed => "confirmed",
            ProposalStatus::Rejected => "rejected",
        }
    }
}

// =============================================================================
// DebtProposal
// =============================================================================

/// DebtProposal records a debt awaiting the debtor's consent.
///
/// The amount is NOT validated for positivity at creation; that check is
/// deferred to confirmation, where the netting engine enforces it. A
/// zero-amount proposal can therefore exist but can only ever be rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebtProposal {
    /// Monotonically increasing unique identifier
    pub id: ProposalId,
    /// The account that claims it is owed
    pub creditor: AccountId,
    /// The account whose consent gates the ledger mutation
    pub debtor: AccountId,
    /// Asset scoping the amount
    pub asset: AssetId,
    /// Amount in the asset's smallest unit
    pub amount: Amount,
    /// Free-form note attached by the proposer
    pub memo: String,
    /// Current lifecycle status
    pub status: ProposalStatus,
    /// When the proposal was created
    pub proposed_at: DateTime<Utc>,
}

impl DebtProposal {
    /// Create a new open proposal
    pub fn new(
        id: ProposalId,
        creditor: AccountId,
        debtor: AccountId,
        asset: AssetId,
        amount: Amount,
        memo: impl Into<String>,
    ) -> Self {
        Self {
            id,
            creditor,
            debtor,
            asset,
            amount,
            memo: memo.into(),
            status: ProposalStatus::Open,
            proposed_at: Utc::now(),
        }
    }

    /// Check if the proposal is still awaiting resolution
    pub fn is_open(&self) -> bool {
        matches!(self.status, ProposalStatus::Open)
    }

    /// Check whether an account is a party to this proposal
    pub fn involves(&self, account: &AccountId) -> bool {
        &self.creditor == account || &self.debtor == account
    }

    /// Check whether this proposal is between the given pair, either direction
    pub fn is_between(&self, a: &AccountId, b: &AccountId) -> bool {
        (&self.creditor == a && &self.debtor == b) || (&self.creditor == b && &self.debtor == a)
    }

    /// Transition to Confirmed
    ///
    /// # Errors
    /// Returns `DomainError::InvalidStateTransition` unless the proposal is
    /// currently `Open`.
    pub fn confirm(&mut self) -> Result<(), DomainError> {
        if !self.is_open() {
            return Err(DomainError::InvalidStateTransition(format!(
                "Cannot confirm proposal {} in status {}",
                self.id,
                self.status.name()
            )));
        }
        self.status = ProposalStatus::Confirmed;
        Ok(())
    }

    /// Transition to Rejected
    ///
    /// # Errors
    /// Returns `DomainError::InvalidStateTransition` unless the proposal is
    /// currently `Open`.
    pub fn reject(&mut self) -> Result<(), DomainError> {
        if !self.is_open() {
            return Err(DomainError::InvalidStateTransition(format!(
                "Cannot reject proposal {} in status {}",
                self.id,
                self.status.name()
            )));
        }
        self.status = ProposalStatus::Rejected;
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
