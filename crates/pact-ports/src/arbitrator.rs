//! # Arbitrator Port
//!
//! The external oracle that resolves challenged claims. The protocol pays
//! it fees, receives dispute handles, and consumes the ruling events it
//! emits. How a ruling is produced — a vote, a panel, a single authority —
//! is outside the boundary.
//!
//! Fees are dynamic: the coordinator queries [`arbitration_cost`] and
//! [`appeal_cost`] live at each call rather than caching them across calls.
//!
//! [`arbitration_cost`]: ArbitratorPort::arbitration_cost
//! [`appeal_cost`]: ArbitratorPort::appeal_cost

use chrono::Duration;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use pact_core::{ArbitratorDisputeId, NativeAmount};

/// The arbitrator's decision on a dispute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ruling {
    /// The claim stands: the claimant is owed the escrowed amount.
    ForClaimant,
    /// The claim is voided: the challenger takes the stake pool.
    ForChallenger,
}

impl Ruling {
    /// The canonical string name of this ruling.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ForClaimant => "FOR_CLAIMANT",
            Self::ForChallenger => "FOR_CHALLENGER",
        }
    }
}

impl std::fmt::Display for Ruling {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A ruling report emitted by the arbitrator.
///
/// Delivered to the dispute coordinator, which is the sole consumer and
/// must tolerate the same event arriving more than once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RulingEvent {
    /// The arbitrator's dispute handle.
    pub dispute: ArbitratorDisputeId,
    /// The reported ruling.
    pub ruling: Ruling,
}

/// Failures reported by an arbitrator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArbitratorError {
    /// The fee paid does not cover the arbitrator's current cost.
    #[error("fee {paid} below required {required}")]
    FeeTooLow {
        /// The fee offered.
        paid: NativeAmount,
        /// The arbitrator's current cost.
        required: NativeAmount,
    },

    /// The dispute handle is unknown to the arbitrator.
    #[error("unknown dispute {0}")]
    UnknownDispute(ArbitratorDisputeId),

    /// The dispute is not in a state that accepts this call.
    #[error("dispute {dispute} cannot accept {operation}")]
    InvalidDisputeState {
        /// The dispute handle.
        dispute: ArbitratorDisputeId,
        /// The rejected operation.
        operation: &'static str,
    },
}

/// The arbitration oracle boundary.
pub trait ArbitratorPort: Send + Sync {
    /// The current cost of opening a dispute.
    fn arbitration_cost(&self) -> NativeAmount;

    /// The current cost of appealing a ruling.
    fn appeal_cost(&self) -> NativeAmount;

    /// Open a dispute, consuming `fee`.
    ///
    /// # Errors
    ///
    /// Returns [`ArbitratorError::FeeTooLow`] if `fee` does not cover the
    /// current arbitration cost.
    fn create_dispute(&self, fee: NativeAmount) -> Result<ArbitratorDisputeId, ArbitratorError>;

    /// Appeal the provisional ruling of `dispute`, consuming `fee`.
    ///
    /// # Errors
    ///
    /// Returns [`ArbitratorError::FeeTooLow`], [`UnknownDispute`], or
    /// [`InvalidDisputeState`] if the dispute has no ruling to appeal.
    ///
    /// [`UnknownDispute`]: ArbitratorError::UnknownDispute
    /// [`InvalidDisputeState`]: ArbitratorError::InvalidDisputeState
    fn appeal(&self, dispute: ArbitratorDisputeId, fee: NativeAmount)
        -> Result<(), ArbitratorError>;

    /// The appeal window the arbitrator grants after a provisional ruling
    /// on `dispute`.
    fn appeal_window(&self, dispute: ArbitratorDisputeId) -> Duration;
}

// ---------------------------------------------------------------------------
// In-memory implementation
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct DisputeRecord {
    ruled: bool,
    appeals: u32,
}

#[derive(Debug, Default)]
struct ArbitratorState {
    cost: NativeAmount,
    disputes: Vec<DisputeRecord>,
    fees_collected: NativeAmount,
}

/// A centralized appealable arbitrator with an adjustable fee and a fixed
/// appeal window.
///
/// Deterministic stand-in for a real arbitration service: `give_ruling`
/// produces the [`RulingEvent`] a test then delivers to the coordinator,
/// once provisionally and once to finalize. Fees are consumed on
/// `create_dispute` and `appeal` and tracked for conservation checks.
pub struct AppealableArbitrator {
    window: Duration,
    state: Mutex<ArbitratorState>,
}

impl AppealableArbitrator {
    /// Create an arbitrator charging `cost` per dispute and per appeal,
    /// granting `window` between a provisional ruling and finalization.
    pub fn new(cost: NativeAmount, window: Duration) -> Self {
        Self {
            window,
            state: Mutex::new(ArbitratorState {
                cost,
                ..ArbitratorState::default()
            }),
        }
    }

    /// Change the per-dispute and per-appeal fee, effective immediately.
    ///
    /// Callers querying [`arbitration_cost`] after this see the new level;
    /// tests use it to exercise fee changes between protocol calls.
    ///
    /// [`arbitration_cost`]: ArbitratorPort::arbitration_cost
    pub fn set_arbitration_price(&self, cost: NativeAmount) {
        self.state.lock().cost = cost;
    }

    /// Total fees this arbitrator has consumed.
    pub fn fees_collected(&self) -> NativeAmount {
        self.state.lock().fees_collected
    }

    /// Report a ruling for `dispute`.
    ///
    /// Returns the event to deliver to the coordinator. The arbitrator does
    /// not track provisional-versus-final itself — the coordinator owns the
    /// appeal deadline — so repeated calls simply produce repeated events,
    /// which the coordinator must handle.
    ///
    /// # Errors
    ///
    /// Returns [`ArbitratorError::UnknownDispute`] for a handle this
    /// arbitrator never issued.
    pub fn give_ruling(
        &self,
        dispute: ArbitratorDisputeId,
        ruling: Ruling,
    ) -> Result<RulingEvent, ArbitratorError> {
        let mut state = self.state.lock();
        let record = state
            .disputes
            .get_mut(dispute.index() as usize)
            .ok_or(ArbitratorError::UnknownDispute(dispute))?;
        record.ruled = true;
        Ok(RulingEvent { dispute, ruling })
    }

    /// How many appeals `dispute` has received.
    pub fn appeal_count(&self, dispute: ArbitratorDisputeId) -> u32 {
        self.state
            .lock()
            .disputes
            .get(dispute.index() as usize)
            .map(|r| r.appeals)
            .unwrap_or(0)
    }
}

impl ArbitratorPort for AppealableArbitrator {
    fn arbitration_cost(&self) -> NativeAmount {
        self.state.lock().cost
    }

    fn appeal_cost(&self) -> NativeAmount {
        self.state.lock().cost
    }

    fn create_dispute(&self, fee: NativeAmount) -> Result<ArbitratorDisputeId, ArbitratorError> {
        let mut state = self.state.lock();
        if fee < state.cost {
            return Err(ArbitratorError::FeeTooLow {
                paid: fee,
                required: state.cost,
            });
        }
        let id = ArbitratorDisputeId::new(state.disputes.len() as u64);
        state.disputes.push(DisputeRecord::default());
        state.fees_collected = state
            .fees_collected
            .checked_add(fee)
            .expect("fee overflow in test arbitrator");
        Ok(id)
    }

    fn appeal(
        &self,
        dispute: ArbitratorDisputeId,
        fee: NativeAmount,
    ) -> Result<(), ArbitratorError> {
        let mut state = self.state.lock();
        if fee < state.cost {
            return Err(ArbitratorError::FeeTooLow {
                paid: fee,
                required: state.cost,
            });
        }
        let record = state
            .disputes
            .get_mut(dispute.index() as usize)
            .ok_or(ArbitratorError::UnknownDispute(dispute))?;
        if !record.ruled {
            return Err(ArbitratorError::InvalidDisputeState {
                dispute,
                operation: "appeal",
            });
        }
        record.appeals += 1;
        state.fees_collected = state
            .fees_collected
            .checked_add(fee)
            .expect("fee overflow in test arbitrator");
        Ok(())
    }

    fn appeal_window(&self, _dispute: ArbitratorDisputeId) -> Duration {
        self.window
    }
}
