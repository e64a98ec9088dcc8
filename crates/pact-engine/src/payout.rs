//! # Payout Engine
//!
//! Every transfer out of custody goes through here. The engine owns the
//! two hard guarantees of the money path:
//!
//! - the escrowed asset of a transaction is disbursed at most once, guarded
//!   by the transaction's `disbursed` flag checked and set in the same call;
//! - a batch of native releases lands all-or-nothing: if one push fails,
//!   the pushes already made are pulled back before the error surfaces.
//!
//! Each successful transfer appends a [`PayoutReceipt`] to an append-only
//! log, the audit trail for conservation checks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use pact_core::{AccountId, NativeAmount, TokenAmount, TransactionId};
use pact_ports::{AssetTransferPort, NativeTransferPort};

use crate::error::EscrowError;
use crate::transaction::Transaction;

/// What a payout was for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PayoutKind {
    /// The escrowed asset left custody to the entitled party.
    EscrowDisbursed,
    /// A claim's posted payment returned to the claimant.
    DepositReturned,
    /// A stake pool awarded by a ruling.
    StakeAwarded,
    /// A consumed arbitration fee forwarded to the arbitrator's account.
    FeeForwarded,
}

impl PayoutKind {
    /// The canonical string name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EscrowDisbursed => "ESCROW_DISBURSED",
            Self::DepositReturned => "DEPOSIT_RETURNED",
            Self::StakeAwarded => "STAKE_AWARDED",
            Self::FeeForwarded => "FEE_FORWARDED",
        }
    }
}

impl std::fmt::Display for PayoutKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A recorded transfer out of custody.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutReceipt {
    /// Unique receipt identifier.
    pub id: Uuid,
    /// The transaction the payout belongs to.
    pub transaction: TransactionId,
    /// What the payout was for.
    pub kind: PayoutKind,
    /// The recipient.
    pub to: AccountId,
    /// The asset amount moved, for [`PayoutKind::EscrowDisbursed`].
    pub token_amount: Option<TokenAmount>,
    /// The native amount moved, for every other kind.
    pub native_amount: Option<NativeAmount>,
    /// When the payout executed.
    pub at: DateTime<Utc>,
}

/// One native release within a batch.
#[derive(Debug, Clone)]
pub struct NativeRelease {
    /// The recipient.
    pub to: AccountId,
    /// The amount to push.
    pub amount: NativeAmount,
    /// What the release is for.
    pub kind: PayoutKind,
}

/// Executes payouts and keeps the receipt log.
#[derive(Default)]
pub struct PayoutEngine {
    receipts: Vec<PayoutReceipt>,
}

impl PayoutEngine {
    /// Create an engine with an empty receipt log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Disburse the escrowed asset of `tx` to `to`.
    ///
    /// Checks and sets the `disbursed` flag in the same call, so a second
    /// disbursement of the same escrow is impossible.
    ///
    /// # Errors
    ///
    /// [`EscrowError::AlreadyDisbursed`] if the escrow already left custody,
    /// or the asset port's error if the push fails. On error the flag stays
    /// unset and no receipt is recorded.
    pub fn disburse_escrow(
        &mut self,
        assets: &dyn AssetTransferPort,
        tx: &mut Transaction,
        to: &AccountId,
        now: DateTime<Utc>,
    ) -> Result<(), EscrowError> {
        if tx.disbursed {
            return Err(EscrowError::AlreadyDisbursed(tx.id));
        }
        assets.push(&tx.asset, to, tx.amount)?;
        tx.disbursed = true;
        self.receipts.push(PayoutReceipt {
            id: Uuid::new_v4(),
            transaction: tx.id,
            kind: PayoutKind::EscrowDisbursed,
            to: to.clone(),
            token_amount: Some(tx.amount),
            native_amount: None,
            at: now,
        });
        tracing::info!(
            transaction = %tx.id,
            recipient = %to,
            amount = %tx.amount,
            "escrow disbursed"
        );
        Ok(())
    }

    /// Release a batch of native amounts from custody, all-or-nothing.
    ///
    /// Zero-amount releases are skipped. If a push fails, every push
    /// already made in this batch is pulled back before the error returns,
    /// and no receipts are recorded.
    pub fn release_native(
        &mut self,
        bank: &dyn NativeTransferPort,
        transaction: TransactionId,
        releases: &[NativeRelease],
        now: DateTime<Utc>,
    ) -> Result<(), EscrowError> {
        let live: Vec<&NativeRelease> = releases.iter().filter(|r| !r.amount.is_zero()).collect();

        for (done, release) in live.iter().enumerate() {
            if let Err(err) = bank.push(&release.to, release.amount) {
                for unwound in &live[..done] {
                    // Rewinding a push back into custody cannot hit a
                    // balance check the push itself did not just satisfy.
                    let _ = bank.pull(&unwound.to, unwound.amount);
                }
                return Err(err.into());
            }
        }

        for release in live {
            self.receipts.push(PayoutReceipt {
                id: Uuid::new_v4(),
                transaction,
                kind: release.kind,
                to: release.to.clone(),
                token_amount: None,
                native_amount: Some(release.amount),
                at: now,
            });
            tracing::debug!(
                %transaction,
                recipient = %release.to,
                amount = %release.amount,
                kind = %release.kind,
                "native release"
            );
        }
        Ok(())
    }

    /// The current end of the receipt log.
    ///
    /// Taken before a multi-call sequence so [`unwind_to`] can discard the
    /// receipts of transfers that were later reversed.
    ///
    /// [`unwind_to`]: Self::unwind_to
    pub fn checkpoint(&self) -> usize {
        self.receipts.len()
    }

    /// Drop every receipt appended after `checkpoint`.
    ///
    /// Called only after the corresponding transfers have been pulled back:
    /// the log must never describe a movement that was undone, or the
    /// conservation audit double-counts.
    pub fn unwind_to(&mut self, checkpoint: usize) {
        self.receipts.truncate(checkpoint);
    }

    /// The full receipt log, in execution order.
    pub fn receipts(&self) -> &[PayoutReceipt] {
        &self.receipts
    }

    /// Total native currency released for `transaction`.
    pub fn native_released(&self, transaction: TransactionId) -> NativeAmount {
        self.receipts
            .iter()
            .filter(|r| r.transaction == transaction)
            .filter_map(|r| r.native_amount)
            .sum()
    }
}
