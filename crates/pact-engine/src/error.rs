//! # Engine Errors
//!
//! Every fallible operation returns [`EscrowError`]. Variants carry the
//! identifiers and amounts a caller needs to act on the failure without a
//! second query. [`EscrowError::kind`] collapses the taxonomy into four
//! classes for callers that route on category rather than variant.

use chrono::{DateTime, Utc};
use thiserror::Error;

use pact_core::{
    AccountId, ArbitratorDisputeId, ClaimId, DisputeId, NativeAmount, TransactionId,
};
use pact_ports::{ArbitratorError, AssetPortError, NativePortError};

use crate::claim::ClaimStatus;
use crate::dispute::DisputeStatus;

/// Coarse classification of an [`EscrowError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The referenced record does not exist.
    NotFound,
    /// The record exists but its state rejects the operation.
    PreconditionFailed,
    /// A payment does not cover the required deposit or fee.
    InsufficientFunds,
    /// An external port refused a transfer or arbitrator call.
    TransferFailed,
}

/// Failures of the escrow engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EscrowError {
    /// No transaction exists under this handle.
    #[error("transaction {0} not found")]
    TransactionNotFound(TransactionId),

    /// No claim exists under this handle.
    #[error("claim {0} not found")]
    ClaimNotFound(ClaimId),

    /// No dispute exists under this handle.
    #[error("dispute {0} not found")]
    DisputeNotFound(DisputeId),

    /// A ruling arrived for an arbitrator handle the coordinator never
    /// registered.
    #[error("no dispute registered for arbitrator handle {0}")]
    UnknownArbitratorDispute(ArbitratorDisputeId),

    /// The escrowed amount of a new transaction must be positive.
    #[error("escrow amount must be positive")]
    ZeroAmount,

    /// Refund requested before the payment timeout elapsed.
    #[error("transaction {transaction} not refundable until {refundable_at}")]
    TimeoutNotElapsed {
        /// The transaction the refund targets.
        transaction: TransactionId,
        /// The instant the refund becomes available.
        refundable_at: DateTime<Utc>,
    },

    /// Refund requested while claims are still running.
    #[error("transaction {transaction} has {running} running claim(s)")]
    ClaimsStillRunning {
        /// The transaction the refund targets.
        transaction: TransactionId,
        /// Claims not yet resolved.
        running: u32,
    },

    /// The transaction's escrow has already been disbursed.
    #[error("escrow of transaction {0} already disbursed")]
    AlreadyDisbursed(TransactionId),

    /// The operation requires a disbursed transaction.
    #[error("escrow of transaction {0} is still held")]
    TransactionStillOpen(TransactionId),

    /// The claim is not pending.
    #[error("claim {claim} is {status}, not PENDING")]
    ClaimNotPending {
        /// The claim involved.
        claim: ClaimId,
        /// Its current status.
        status: ClaimStatus,
    },

    /// Payment requested before the claim's challenge period elapsed.
    #[error("claim {claim} not payable until {payable_at}")]
    ChallengePeriodNotElapsed {
        /// The claim involved.
        claim: ClaimId,
        /// The instant the claim becomes payable.
        payable_at: DateTime<Utc>,
    },

    /// The claim has no dispute to appeal.
    #[error("claim {0} has no dispute")]
    ClaimNotDisputed(ClaimId),

    /// Amount arithmetic overflowed or underflowed.
    #[error("amount arithmetic overflow")]
    AmountOverflow,

    /// The dispute's state rejects the operation.
    #[error("dispute {dispute} is {status}, cannot accept {operation}")]
    InvalidDisputeState {
        /// The dispute involved.
        dispute: DisputeId,
        /// Its current status.
        status: DisputeStatus,
        /// The rejected operation.
        operation: &'static str,
    },

    /// Appeal requested at or after the appeal deadline.
    #[error("appeal window of dispute {dispute} closed at {deadline}")]
    AppealWindowClosed {
        /// The dispute involved.
        dispute: DisputeId,
        /// The deadline that passed.
        deadline: DateTime<Utc>,
    },

    /// The appellant is neither the claimant nor the challenger.
    #[error("account {account} is not a party to dispute {dispute}")]
    NotDisputeParty {
        /// The dispute involved.
        dispute: DisputeId,
        /// The rejected account.
        account: AccountId,
    },

    /// A claim payment below the required deposit plus arbitration fee.
    #[error("claim payment {paid} below required {required}")]
    InsufficientClaimPayment {
        /// The payment offered.
        paid: NativeAmount,
        /// Deposit plus current arbitration fee.
        required: NativeAmount,
    },

    /// A challenge payment below the required deposit plus arbitration fee.
    #[error("challenge payment {paid} below required {required}")]
    InsufficientChallengePayment {
        /// The payment offered.
        paid: NativeAmount,
        /// Deposit plus current arbitration fee.
        required: NativeAmount,
    },

    /// An appeal payment below the current appeal fee.
    #[error("appeal payment {paid} below required {required}")]
    InsufficientAppealPayment {
        /// The payment offered.
        paid: NativeAmount,
        /// The current appeal fee.
        required: NativeAmount,
    },

    /// The asset ledger refused a transfer.
    #[error("asset transfer failed: {0}")]
    AssetTransferFailed(#[from] AssetPortError),

    /// The native bank refused a transfer.
    #[error("native transfer failed: {0}")]
    NativeTransferFailed(#[from] NativePortError),

    /// The arbitrator refused a call.
    #[error("arbitrator call failed: {0}")]
    ArbitratorCallFailed(#[from] ArbitratorError),
}

impl EscrowError {
    /// The coarse class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::TransactionNotFound(_)
            | Self::ClaimNotFound(_)
            | Self::DisputeNotFound(_)
            | Self::UnknownArbitratorDispute(_) => ErrorKind::NotFound,

            Self::ZeroAmount
            | Self::TimeoutNotElapsed { .. }
            | Self::ClaimsStillRunning { .. }
            | Self::AlreadyDisbursed(_)
            | Self::TransactionStillOpen(_)
            | Self::ClaimNotPending { .. }
            | Self::ChallengePeriodNotElapsed { .. }
            | Self::ClaimNotDisputed(_)
            | Self::AmountOverflow
            | Self::InvalidDisputeState { .. }
            | Self::AppealWindowClosed { .. }
            | Self::NotDisputeParty { .. } => ErrorKind::PreconditionFailed,

            Self::InsufficientClaimPayment { .. }
            | Self::InsufficientChallengePayment { .. }
            | Self::InsufficientAppealPayment { .. } => ErrorKind::InsufficientFunds,

            Self::AssetTransferFailed(_)
            | Self::NativeTransferFailed(_)
            | Self::ArbitratorCallFailed(_) => ErrorKind::TransferFailed,
        }
    }
}
