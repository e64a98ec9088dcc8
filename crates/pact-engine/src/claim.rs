//! # Claim Registry Records
//!
//! A claim is a receiver's assertion of entitlement to a transaction's
//! escrow, backed by a native deposit. It is born `Pending`, becomes
//! `Challenged` when a dispute opens against it, and ends `Resolved` when
//! it is paid, withdrawn, or ruled on.
//!
//! `fee_snapshot` records the arbitration cost at claim time. It is the
//! consumed-fee figure when a ruling against the claimant is executed; a
//! challenge always pays the live fee, never the snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pact_core::{AccountId, ClaimId, DisputeId, NativeAmount, TransactionId};

/// Lifecycle state of a claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClaimStatus {
    /// Unchallenged; payable once the challenge period elapses.
    Pending,
    /// A dispute is open against this claim.
    Challenged,
    /// Terminal: paid, withdrawn, or ruled on.
    Resolved,
}

impl ClaimStatus {
    /// The canonical string name of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Challenged => "CHALLENGED",
            Self::Resolved => "RESOLVED",
        }
    }

    /// Whether this status admits no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Resolved)
    }
}

impl std::fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A registered claim against a transaction's escrow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    /// Registry handle, assigned sequentially at creation.
    pub id: ClaimId,
    /// The transaction this claim targets.
    pub transaction: TransactionId,
    /// The account asserting entitlement.
    pub claimant: AccountId,
    /// Lifecycle state.
    pub status: ClaimStatus,
    /// The full native payment posted with the claim, held in custody.
    pub deposit_held: NativeAmount,
    /// Arbitration cost at claim time.
    pub fee_snapshot: NativeAmount,
    /// When the claim was registered. Starts the challenge period.
    pub created_at: DateTime<Utc>,
    /// The dispute opened against this claim, if any.
    pub dispute: Option<DisputeId>,
}
