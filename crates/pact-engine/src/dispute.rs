//! # Dispute Coordinator Records
//!
//! A dispute binds a challenged claim to the arbitrator's dispute handle
//! and carries the stake pool the ruling will divide. Finality is
//! two-step: the first ruling report is provisional and opens an appeal
//! window; a report at or after the appeal deadline executes.
//!
//! ## Security Invariant
//!
//! A dispute finalizes at most once. `finalize` moves `Appealed` to
//! `Finalized` and every later report for the same arbitrator handle is
//! ignored by the coordinator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pact_core::{AccountId, ArbitratorDisputeId, ClaimId, DisputeId, NativeAmount, TransactionId};
use pact_ports::Ruling;

use crate::error::EscrowError;

/// Lifecycle state of a dispute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DisputeStatus {
    /// Awaiting a ruling report.
    Open,
    /// A provisional ruling was reported; the appeal window is running.
    Appealed,
    /// Terminal: the ruling was executed.
    Finalized,
}

impl DisputeStatus {
    /// The canonical string name of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Appealed => "APPEALED",
            Self::Finalized => "FINALIZED",
        }
    }

    /// Whether this status admits no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finalized)
    }
}

impl std::fmt::Display for DisputeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A dispute over a challenged claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dispute {
    /// Coordinator handle, assigned sequentially at creation.
    pub id: DisputeId,
    /// The claim under dispute.
    pub claim: ClaimId,
    /// The transaction the claim targets.
    pub transaction: TransactionId,
    /// The arbitrator's handle for this dispute.
    pub arbitrator_dispute: ArbitratorDisputeId,
    /// The account that challenged the claim.
    pub challenger: AccountId,
    /// Lifecycle state.
    pub status: DisputeStatus,
    /// The most recently reported ruling. Final once `status` is
    /// `Finalized`, provisional before that.
    pub ruling: Option<Ruling>,
    /// The instant the current appeal window closes, while `Appealed`.
    pub appeal_deadline: Option<DateTime<Utc>>,
    /// The claimant side of the stake pool: the claim's posted payment,
    /// plus appeal residue the claimant adds.
    pub claimant_stake: NativeAmount,
    /// The challenger side of the stake pool: the challenge payment net of
    /// the arbitration fee consumed at dispute creation, plus appeal
    /// residue the challenger adds.
    pub challenger_stake: NativeAmount,
    /// How many appeals have been lodged.
    pub appeal_count: u32,
}

impl Dispute {
    /// Record a provisional ruling and open the appeal window.
    ///
    /// # Errors
    ///
    /// Rejects disputes that are not `Open`.
    pub fn record_provisional(
        &mut self,
        ruling: Ruling,
        deadline: DateTime<Utc>,
    ) -> Result<(), EscrowError> {
        if self.status != DisputeStatus::Open {
            return Err(EscrowError::InvalidDisputeState {
                dispute: self.id,
                status: self.status,
                operation: "provisional ruling",
            });
        }
        self.status = DisputeStatus::Appealed;
        self.ruling = Some(ruling);
        self.appeal_deadline = Some(deadline);
        Ok(())
    }

    /// Register an appeal: refresh the deadline and reset the provisional
    /// ruling, pending a fresh report.
    ///
    /// # Errors
    ///
    /// Rejects disputes without a running appeal window.
    pub fn register_appeal(&mut self, new_deadline: DateTime<Utc>) -> Result<(), EscrowError> {
        if self.status != DisputeStatus::Appealed {
            return Err(EscrowError::InvalidDisputeState {
                dispute: self.id,
                status: self.status,
                operation: "appeal",
            });
        }
        self.ruling = None;
        self.appeal_deadline = Some(new_deadline);
        self.appeal_count += 1;
        Ok(())
    }

    /// Execute `ruling` and close the dispute.
    ///
    /// # Errors
    ///
    /// Rejects disputes that are not `Appealed`.
    pub fn finalize(&mut self, ruling: Ruling) -> Result<(), EscrowError> {
        if self.status != DisputeStatus::Appealed {
            return Err(EscrowError::InvalidDisputeState {
                dispute: self.id,
                status: self.status,
                operation: "finalization",
            });
        }
        self.status = DisputeStatus::Finalized;
        self.ruling = Some(ruling);
        self.appeal_deadline = None;
        Ok(())
    }

    /// Whether the appeal window is still open at `now`.
    pub fn appeal_window_open(&self, now: DateTime<Utc>) -> bool {
        matches!(
            (self.status, self.appeal_deadline),
            (DisputeStatus::Appealed, Some(deadline)) if now < deadline
        )
    }

    /// The whole remaining stake pool.
    pub fn total_stake(&self) -> NativeAmount {
        self.claimant_stake
            .checked_add(self.challenger_stake)
            .expect("stake pool overflow")
    }
}
