//! # Escrow Engine
//!
//! The protocol's single entry point. Every operation takes the engine's
//! one lock, validates against current state, performs port calls, and
//! records the state change before releasing the lock. Serializing all
//! mutation through one lock keeps the check-then-act sequences of the
//! money path free of interleavings.
//!
//! Time never comes from the system clock. Every deadline comparison takes
//! `now` as a parameter, so behavior is replayable and the deadline tests
//! are exact.
//!
//! ## Security Invariant
//!
//! Port calls that cannot be completed are unwound before the error
//! returns: a failed sequence leaves custody and every external balance as
//! it found them.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;

use pact_core::{
    AccountId, ArbitratorDisputeId, AssetId, ClaimId, DisputeId, NativeAmount, TokenAmount,
    TransactionId,
};
use pact_ports::{ArbitratorPort, AssetTransferPort, NativeTransferPort, Ruling, RulingEvent};

use crate::claim::{Claim, ClaimStatus};
use crate::dispute::{Dispute, DisputeStatus};
use crate::error::EscrowError;
use crate::payout::{NativeRelease, PayoutEngine, PayoutKind, PayoutReceipt};
use crate::transaction::Transaction;

#[derive(Default)]
struct LedgerState {
    transactions: Vec<Transaction>,
    claims: Vec<Claim>,
    disputes: Vec<Dispute>,
    by_arbitrator: BTreeMap<ArbitratorDisputeId, DisputeId>,
    payouts: PayoutEngine,
}

impl LedgerState {
    fn transaction(&self, id: TransactionId) -> Result<&Transaction, EscrowError> {
        self.transactions
            .get(id.index() as usize)
            .ok_or(EscrowError::TransactionNotFound(id))
    }

    fn claim(&self, id: ClaimId) -> Result<&Claim, EscrowError> {
        self.claims
            .get(id.index() as usize)
            .ok_or(EscrowError::ClaimNotFound(id))
    }

    fn dispute(&self, id: DisputeId) -> Result<&Dispute, EscrowError> {
        self.disputes
            .get(id.index() as usize)
            .ok_or(EscrowError::DisputeNotFound(id))
    }
}

/// The escrow-with-arbitration engine.
///
/// Owns the transaction ledger, the claim registry, the dispute
/// coordinator, and the payout engine, behind one lock. Ports are injected
/// at construction; the engine never constructs its own collaborators.
pub struct EscrowEngine {
    assets: Arc<dyn AssetTransferPort>,
    bank: Arc<dyn NativeTransferPort>,
    arbitrator: Arc<dyn ArbitratorPort>,
    arbitrator_account: AccountId,
    state: Mutex<LedgerState>,
}

impl EscrowEngine {
    /// Create an engine over the given ports.
    ///
    /// `arbitrator_account` receives every consumed arbitration and appeal
    /// fee, keeping native custody fully accounted for.
    pub fn new(
        assets: Arc<dyn AssetTransferPort>,
        bank: Arc<dyn NativeTransferPort>,
        arbitrator: Arc<dyn ArbitratorPort>,
        arbitrator_account: AccountId,
    ) -> Self {
        Self {
            assets,
            bank,
            arbitrator,
            arbitrator_account,
            state: Mutex::new(LedgerState::default()),
        }
    }

    // ── Transaction ledger ──────────────────────────────────────────────

    /// Escrow `amount` of `asset` from `sender` under the given terms.
    ///
    /// Pulls the amount into custody and registers the transaction. Claims
    /// against it must post `claim_deposit` plus the live arbitration fee;
    /// the sender may reclaim after `payment_timeout` if no claim runs.
    ///
    /// # Errors
    ///
    /// [`EscrowError::ZeroAmount`] for an empty escrow, or the asset
    /// port's error if the pull fails.
    #[allow(clippy::too_many_arguments)]
    pub fn create_transaction(
        &self,
        sender: AccountId,
        asset: AssetId,
        amount: TokenAmount,
        claim_deposit: NativeAmount,
        payment_timeout: Duration,
        challenge_period: Duration,
        meta_evidence: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<TransactionId, EscrowError> {
        if amount.is_zero() {
            return Err(EscrowError::ZeroAmount);
        }
        let mut state = self.state.lock();

        self.assets.pull(&asset, &sender, amount)?;

        let id = TransactionId::new(state.transactions.len() as u64);
        state.transactions.push(Transaction {
            id,
            sender: sender.clone(),
            asset,
            amount,
            claim_deposit,
            payment_timeout_secs: payment_timeout.num_seconds(),
            challenge_period_secs: challenge_period.num_seconds(),
            meta_evidence: meta_evidence.into(),
            created_at: now,
            running_claim_count: 0,
            disbursed: false,
        });
        tracing::info!(transaction = %id, %sender, %amount, "transaction created");
        Ok(id)
    }

    /// Return an unclaimed escrow to its sender.
    ///
    /// Available once the payment timeout has elapsed and no claim is
    /// running. Marks the escrow disbursed.
    ///
    /// # Errors
    ///
    /// [`TimeoutNotElapsed`], [`ClaimsStillRunning`], or
    /// [`AlreadyDisbursed`].
    ///
    /// [`TimeoutNotElapsed`]: EscrowError::TimeoutNotElapsed
    /// [`ClaimsStillRunning`]: EscrowError::ClaimsStillRunning
    /// [`AlreadyDisbursed`]: EscrowError::AlreadyDisbursed
    pub fn refund(&self, id: TransactionId, now: DateTime<Utc>) -> Result<(), EscrowError> {
        let mut state = self.state.lock();
        let LedgerState {
            transactions,
            payouts,
            ..
        } = &mut *state;
        let tx = transactions
            .get_mut(id.index() as usize)
            .ok_or(EscrowError::TransactionNotFound(id))?;

        if tx.disbursed {
            return Err(EscrowError::AlreadyDisbursed(id));
        }
        if !tx.is_refund_due(now) {
            return Err(EscrowError::TimeoutNotElapsed {
                transaction: id,
                refundable_at: tx.refundable_at(),
            });
        }
        if tx.running_claim_count > 0 {
            return Err(EscrowError::ClaimsStillRunning {
                transaction: id,
                running: tx.running_claim_count,
            });
        }

        let sender = tx.sender.clone();
        payouts.disburse_escrow(self.assets.as_ref(), tx, &sender, now)?;
        tracing::info!(transaction = %id, %sender, "escrow refunded");
        Ok(())
    }

    // ── Claim registry ──────────────────────────────────────────────────

    /// Claim the escrow of `transaction`, posting `payment` as stake.
    ///
    /// The payment must cover the transaction's claim deposit plus the
    /// arbitration fee at its current level; the fee level is snapshotted
    /// on the claim. Any excess stays in the posted stake.
    ///
    /// # Errors
    ///
    /// [`AlreadyDisbursed`] once the escrow left custody,
    /// [`InsufficientClaimPayment`], or the bank's error if the pull fails.
    ///
    /// [`AlreadyDisbursed`]: EscrowError::AlreadyDisbursed
    /// [`InsufficientClaimPayment`]: EscrowError::InsufficientClaimPayment
    pub fn claim(
        &self,
        transaction: TransactionId,
        claimant: AccountId,
        payment: NativeAmount,
        now: DateTime<Utc>,
    ) -> Result<ClaimId, EscrowError> {
        let mut state = self.state.lock();
        let tx = state.transaction(transaction)?;
        if tx.disbursed {
            return Err(EscrowError::AlreadyDisbursed(transaction));
        }

        let fee = self.arbitrator.arbitration_cost();
        let required = tx
            .claim_deposit
            .checked_add(fee)
            .ok_or(EscrowError::AmountOverflow)?;
        if payment < required {
            return Err(EscrowError::InsufficientClaimPayment {
                paid: payment,
                required,
            });
        }

        self.bank.pull(&claimant, payment)?;

        let id = ClaimId::new(state.claims.len() as u64);
        state.claims.push(Claim {
            id,
            transaction,
            claimant: claimant.clone(),
            status: ClaimStatus::Pending,
            deposit_held: payment,
            fee_snapshot: fee,
            created_at: now,
            dispute: None,
        });
        let tx = &mut state.transactions[transaction.index() as usize];
        tx.running_claim_count += 1;
        tracing::info!(claim = %id, %transaction, %claimant, %payment, "claim registered");
        Ok(id)
    }

    /// Pay out a claim that survived its challenge period.
    ///
    /// Disburses the escrowed asset to the claimant and returns their full
    /// posted stake.
    ///
    /// # Errors
    ///
    /// [`ClaimNotPending`], [`ChallengePeriodNotElapsed`], or
    /// [`AlreadyDisbursed`] if another claim was paid first.
    ///
    /// [`ClaimNotPending`]: EscrowError::ClaimNotPending
    /// [`ChallengePeriodNotElapsed`]: EscrowError::ChallengePeriodNotElapsed
    /// [`AlreadyDisbursed`]: EscrowError::AlreadyDisbursed
    pub fn pay(&self, claim: ClaimId, now: DateTime<Utc>) -> Result<(), EscrowError> {
        let mut state = self.state.lock();
        let LedgerState {
            transactions,
            claims,
            payouts,
            ..
        } = &mut *state;
        let record = claims
            .get_mut(claim.index() as usize)
            .ok_or(EscrowError::ClaimNotFound(claim))?;
        let tx = transactions
            .get_mut(record.transaction.index() as usize)
            .ok_or(EscrowError::TransactionNotFound(record.transaction))?;

        if record.status != ClaimStatus::Pending {
            return Err(EscrowError::ClaimNotPending {
                claim,
                status: record.status,
            });
        }
        let payable_at = tx.payable_at(record.created_at);
        if now < payable_at {
            return Err(EscrowError::ChallengePeriodNotElapsed { claim, payable_at });
        }
        if tx.disbursed {
            return Err(EscrowError::AlreadyDisbursed(tx.id));
        }

        let mark = payouts.checkpoint();
        payouts.release_native(
            self.bank.as_ref(),
            tx.id,
            &[NativeRelease {
                to: record.claimant.clone(),
                amount: record.deposit_held,
                kind: PayoutKind::DepositReturned,
            }],
            now,
        )?;
        if let Err(err) =
            payouts.disburse_escrow(self.assets.as_ref(), tx, &record.claimant, now)
        {
            let _ = self.bank.pull(&record.claimant, record.deposit_held);
            payouts.unwind_to(mark);
            return Err(err);
        }

        record.status = ClaimStatus::Resolved;
        tx.running_claim_count = tx.running_claim_count.saturating_sub(1);
        tracing::info!(%claim, transaction = %tx.id, claimant = %record.claimant, "claim paid");
        Ok(())
    }

    /// Recover the stake of a pending claim whose transaction's escrow
    /// already went elsewhere.
    ///
    /// # Errors
    ///
    /// [`ClaimNotPending`] or [`TransactionStillOpen`] while the escrow is
    /// still held.
    ///
    /// [`ClaimNotPending`]: EscrowError::ClaimNotPending
    /// [`TransactionStillOpen`]: EscrowError::TransactionStillOpen
    pub fn withdraw_claim(&self, claim: ClaimId, now: DateTime<Utc>) -> Result<(), EscrowError> {
        let mut state = self.state.lock();
        let LedgerState {
            transactions,
            claims,
            payouts,
            ..
        } = &mut *state;
        let record = claims
            .get_mut(claim.index() as usize)
            .ok_or(EscrowError::ClaimNotFound(claim))?;
        let tx = transactions
            .get_mut(record.transaction.index() as usize)
            .ok_or(EscrowError::TransactionNotFound(record.transaction))?;

        if record.status != ClaimStatus::Pending {
            return Err(EscrowError::ClaimNotPending {
                claim,
                status: record.status,
            });
        }
        if !tx.disbursed {
            return Err(EscrowError::TransactionStillOpen(tx.id));
        }

        payouts.release_native(
            self.bank.as_ref(),
            tx.id,
            &[NativeRelease {
                to: record.claimant.clone(),
                amount: record.deposit_held,
                kind: PayoutKind::DepositReturned,
            }],
            now,
        )?;
        record.status = ClaimStatus::Resolved;
        tx.running_claim_count = tx.running_claim_count.saturating_sub(1);
        tracing::info!(%claim, transaction = %tx.id, "claim withdrawn");
        Ok(())
    }

    // ── Dispute coordinator ─────────────────────────────────────────────

    /// Challenge a pending claim, opening a dispute at the arbitrator.
    ///
    /// The challenger matches the claim deposit plus the arbitration fee
    /// at its current level, queried live so a fee change after the claim
    /// can never make the claim unchallengeable. The fee is consumed from
    /// the challenger's payment and forwarded to the arbitrator's account;
    /// the remainder joins the stake pool the ruling will divide.
    ///
    /// # Errors
    ///
    /// [`ClaimNotPending`], [`InsufficientChallengePayment`], a bank
    /// error, or the arbitrator's error if dispute creation fails. All
    /// transfers are unwound on failure.
    ///
    /// [`ClaimNotPending`]: EscrowError::ClaimNotPending
    /// [`InsufficientChallengePayment`]: EscrowError::InsufficientChallengePayment
    pub fn challenge_claim(
        &self,
        claim: ClaimId,
        challenger: AccountId,
        payment: NativeAmount,
        now: DateTime<Utc>,
    ) -> Result<DisputeId, EscrowError> {
        let mut state = self.state.lock();
        let record = state.claim(claim)?;
        let tx = state.transaction(record.transaction)?;

        if record.status != ClaimStatus::Pending {
            return Err(EscrowError::ClaimNotPending {
                claim,
                status: record.status,
            });
        }
        let fee = self.arbitrator.arbitration_cost();
        let required = tx
            .claim_deposit
            .checked_add(fee)
            .ok_or(EscrowError::AmountOverflow)?;
        if payment < required {
            return Err(EscrowError::InsufficientChallengePayment {
                paid: payment,
                required,
            });
        }

        let transaction = tx.id;
        let claimant_stake = record.deposit_held;
        let challenger_stake = payment
            .checked_sub(fee)
            .ok_or(EscrowError::AmountOverflow)?;

        self.bank.pull(&challenger, payment)?;

        let LedgerState {
            claims,
            disputes,
            by_arbitrator,
            payouts,
            ..
        } = &mut *state;
        let mark = payouts.checkpoint();
        if let Err(err) = payouts.release_native(
            self.bank.as_ref(),
            transaction,
            &[NativeRelease {
                to: self.arbitrator_account.clone(),
                amount: fee,
                kind: PayoutKind::FeeForwarded,
            }],
            now,
        ) {
            let _ = self.bank.push(&challenger, payment);
            return Err(err);
        }
        let arbitrator_dispute = match self.arbitrator.create_dispute(fee) {
            Ok(handle) => handle,
            Err(err) => {
                let _ = self.bank.pull(&self.arbitrator_account, fee);
                let _ = self.bank.push(&challenger, payment);
                payouts.unwind_to(mark);
                return Err(err.into());
            }
        };

        let id = DisputeId::new(disputes.len() as u64);
        disputes.push(Dispute {
            id,
            claim,
            transaction,
            arbitrator_dispute,
            challenger: challenger.clone(),
            status: DisputeStatus::Open,
            ruling: None,
            appeal_deadline: None,
            claimant_stake,
            challenger_stake,
            appeal_count: 0,
        });
        by_arbitrator.insert(arbitrator_dispute, id);

        let record = &mut claims[claim.index() as usize];
        record.status = ClaimStatus::Challenged;
        record.dispute = Some(id);
        tracing::info!(
            dispute = %id,
            %claim,
            %challenger,
            %arbitrator_dispute,
            "claim challenged"
        );
        Ok(id)
    }

    /// Appeal the provisional ruling on the dispute over `claim`.
    ///
    /// Only the claimant or the challenger may appeal, while the appeal
    /// window is open. The appeal fee is consumed from `payment` and the
    /// remainder joins the appellant's side of the stake pool. Finality
    /// resets: the next ruling report is provisional again.
    ///
    /// # Errors
    ///
    /// [`ClaimNotDisputed`], [`AppealWindowClosed`], [`NotDisputeParty`],
    /// [`InsufficientAppealPayment`], or a port error. All transfers are
    /// unwound on failure.
    ///
    /// [`ClaimNotDisputed`]: EscrowError::ClaimNotDisputed
    /// [`AppealWindowClosed`]: EscrowError::AppealWindowClosed
    /// [`NotDisputeParty`]: EscrowError::NotDisputeParty
    /// [`InsufficientAppealPayment`]: EscrowError::InsufficientAppealPayment
    pub fn appeal(
        &self,
        claim: ClaimId,
        appellant: AccountId,
        payment: NativeAmount,
        now: DateTime<Utc>,
    ) -> Result<(), EscrowError> {
        let mut state = self.state.lock();
        let record = state.claim(claim)?;
        let dispute_id = record.dispute.ok_or(EscrowError::ClaimNotDisputed(claim))?;
        let claimant = record.claimant.clone();
        let dispute = state.dispute(dispute_id)?;

        if !dispute.appeal_window_open(now) {
            return match (dispute.status, dispute.appeal_deadline) {
                (DisputeStatus::Appealed, Some(deadline)) => Err(EscrowError::AppealWindowClosed {
                    dispute: dispute_id,
                    deadline,
                }),
                (status, _) => Err(EscrowError::InvalidDisputeState {
                    dispute: dispute_id,
                    status,
                    operation: "appeal",
                }),
            };
        }
        let claimant_side = if appellant == claimant {
            true
        } else if appellant == dispute.challenger {
            false
        } else {
            return Err(EscrowError::NotDisputeParty {
                dispute: dispute_id,
                account: appellant,
            });
        };

        let fee = self.arbitrator.appeal_cost();
        if payment < fee {
            return Err(EscrowError::InsufficientAppealPayment {
                paid: payment,
                required: fee,
            });
        }
        let residual = payment
            .checked_sub(fee)
            .ok_or(EscrowError::AmountOverflow)?;
        let arbitrator_dispute = dispute.arbitrator_dispute;
        let transaction = dispute.transaction;

        self.bank.pull(&appellant, payment)?;

        let LedgerState {
            disputes, payouts, ..
        } = &mut *state;
        let mark = payouts.checkpoint();
        if let Err(err) = payouts.release_native(
            self.bank.as_ref(),
            transaction,
            &[NativeRelease {
                to: self.arbitrator_account.clone(),
                amount: fee,
                kind: PayoutKind::FeeForwarded,
            }],
            now,
        ) {
            let _ = self.bank.push(&appellant, payment);
            return Err(err);
        }
        if let Err(err) = self.arbitrator.appeal(arbitrator_dispute, fee) {
            let _ = self.bank.pull(&self.arbitrator_account, fee);
            let _ = self.bank.push(&appellant, payment);
            payouts.unwind_to(mark);
            return Err(err.into());
        }

        let dispute = &mut disputes[dispute_id.index() as usize];
        let window = self.arbitrator.appeal_window(arbitrator_dispute);
        dispute.register_appeal(now + window)?;
        if claimant_side {
            dispute.claimant_stake = dispute
                .claimant_stake
                .checked_add(residual)
                .ok_or(EscrowError::AmountOverflow)?;
        } else {
            dispute.challenger_stake = dispute
                .challenger_stake
                .checked_add(residual)
                .ok_or(EscrowError::AmountOverflow)?;
        }
        tracing::info!(
            dispute = %dispute_id,
            %appellant,
            appeals = dispute.appeal_count,
            "ruling appealed"
        );
        Ok(())
    }

    /// Consume a ruling report from the arbitrator.
    ///
    /// The first report on an open dispute is provisional: it opens the
    /// appeal window and changes no balances. A report at or after the
    /// appeal deadline executes the reported ruling. Reports on a
    /// finalized dispute are ignored.
    ///
    /// # Errors
    ///
    /// [`UnknownArbitratorDispute`] for an unregistered handle, or a port
    /// error during payout execution.
    ///
    /// [`UnknownArbitratorDispute`]: EscrowError::UnknownArbitratorDispute
    pub fn receive_ruling(
        &self,
        event: RulingEvent,
        now: DateTime<Utc>,
    ) -> Result<(), EscrowError> {
        let mut state = self.state.lock();
        let dispute_id = *state
            .by_arbitrator
            .get(&event.dispute)
            .ok_or(EscrowError::UnknownArbitratorDispute(event.dispute))?;

        let LedgerState {
            transactions,
            claims,
            disputes,
            payouts,
            ..
        } = &mut *state;
        let dispute = &mut disputes[dispute_id.index() as usize];

        match dispute.status {
            DisputeStatus::Finalized => {
                tracing::debug!(dispute = %dispute_id, "ruling report on finalized dispute ignored");
                Ok(())
            }
            DisputeStatus::Open => {
                let deadline = now + self.arbitrator.appeal_window(event.dispute);
                dispute.record_provisional(event.ruling, deadline)?;
                tracing::info!(
                    dispute = %dispute_id,
                    ruling = %event.ruling,
                    %deadline,
                    "provisional ruling recorded"
                );
                Ok(())
            }
            DisputeStatus::Appealed if dispute.appeal_window_open(now) => {
                dispute.ruling = Some(event.ruling);
                tracing::debug!(
                    dispute = %dispute_id,
                    ruling = %event.ruling,
                    "provisional ruling updated inside appeal window"
                );
                Ok(())
            }
            DisputeStatus::Appealed => {
                let record = claims
                    .get_mut(dispute.claim.index() as usize)
                    .ok_or(EscrowError::ClaimNotFound(dispute.claim))?;
                let tx = transactions
                    .get_mut(dispute.transaction.index() as usize)
                    .ok_or(EscrowError::TransactionNotFound(dispute.transaction))?;

                match event.ruling {
                    Ruling::ForChallenger => {
                        payouts.release_native(
                            self.bank.as_ref(),
                            tx.id,
                            &[NativeRelease {
                                to: dispute.challenger.clone(),
                                amount: dispute.total_stake(),
                                kind: PayoutKind::StakeAwarded,
                            }],
                            now,
                        )?;
                    }
                    Ruling::ForClaimant => {
                        let claimant_payout = dispute
                            .claimant_stake
                            .checked_sub(record.fee_snapshot)
                            .ok_or(EscrowError::AmountOverflow)?;
                        let releases = [
                            NativeRelease {
                                to: record.claimant.clone(),
                                amount: claimant_payout,
                                kind: PayoutKind::StakeAwarded,
                            },
                            NativeRelease {
                                to: dispute.challenger.clone(),
                                amount: dispute.challenger_stake,
                                kind: PayoutKind::StakeAwarded,
                            },
                            NativeRelease {
                                to: self.arbitrator_account.clone(),
                                amount: record.fee_snapshot,
                                kind: PayoutKind::FeeForwarded,
                            },
                        ];
                        let mark = payouts.checkpoint();
                        payouts.release_native(self.bank.as_ref(), tx.id, &releases, now)?;
                        if !tx.disbursed {
                            if let Err(err) = payouts.disburse_escrow(
                                self.assets.as_ref(),
                                tx,
                                &record.claimant,
                                now,
                            ) {
                                for release in &releases {
                                    let _ = self.bank.pull(&release.to, release.amount);
                                }
                                payouts.unwind_to(mark);
                                return Err(err);
                            }
                        }
                    }
                }

                dispute.finalize(event.ruling)?;
                record.status = ClaimStatus::Resolved;
                tx.running_claim_count = tx.running_claim_count.saturating_sub(1);
                tracing::info!(
                    dispute = %dispute_id,
                    ruling = %event.ruling,
                    "ruling executed"
                );
                Ok(())
            }
        }
    }

    // ── Read model ──────────────────────────────────────────────────────

    /// The transaction record under `id`.
    pub fn transactions(&self, id: TransactionId) -> Result<Transaction, EscrowError> {
        self.state.lock().transaction(id).cloned()
    }

    /// The claim record under `id`.
    pub fn claims(&self, id: ClaimId) -> Result<Claim, EscrowError> {
        self.state.lock().claim(id).cloned()
    }

    /// The dispute record under `id`.
    pub fn disputes(&self, id: DisputeId) -> Result<Dispute, EscrowError> {
        self.state.lock().dispute(id).cloned()
    }

    /// The dispute opened against `claim`, if any.
    pub fn dispute_for_claim(&self, claim: ClaimId) -> Result<Option<Dispute>, EscrowError> {
        let state = self.state.lock();
        let record = state.claim(claim)?;
        match record.dispute {
            Some(id) => state.dispute(id).cloned().map(Some),
            None => Ok(None),
        }
    }

    /// A snapshot of the payout receipt log.
    pub fn receipts(&self) -> Vec<PayoutReceipt> {
        self.state.lock().payouts.receipts().to_vec()
    }

    /// How many transactions the ledger holds.
    pub fn transaction_count(&self) -> u64 {
        self.state.lock().transactions.len() as u64
    }

    /// How many claims the registry holds.
    pub fn claim_count(&self) -> u64 {
        self.state.lock().claims.len() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pact_ports::{AppealableArbitrator, ArbitratorError, InMemoryAssetLedger, InMemoryBank};

    const AMOUNT: u128 = 100;
    const DEPOSIT: u128 = 100;
    const FEE: u128 = 20;
    const PAYMENT: u128 = 120;
    const TIMEOUT: i64 = 864_000;
    const PERIOD: i64 = 259_200;
    const WINDOW: i64 = 42;

    struct Harness {
        ledger: Arc<InMemoryAssetLedger>,
        bank: Arc<InMemoryBank>,
        arbitrator: Arc<AppealableArbitrator>,
        engine: EscrowEngine,
        t0: DateTime<Utc>,
    }

    fn account(name: &str) -> AccountId {
        AccountId::new(name).unwrap()
    }

    fn asset() -> AssetId {
        AssetId::new("erc20-mock").unwrap()
    }

    fn harness() -> Harness {
        let ledger = Arc::new(InMemoryAssetLedger::new());
        let bank = Arc::new(InMemoryBank::new());
        let arbitrator = Arc::new(AppealableArbitrator::new(
            NativeAmount::new(FEE),
            Duration::seconds(WINDOW),
        ));
        let engine = EscrowEngine::new(
            ledger.clone(),
            bank.clone(),
            arbitrator.clone(),
            account("arbitrator"),
        );
        Harness {
            ledger,
            bank,
            arbitrator,
            engine,
            t0: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    /// Arbitration service double whose calls fail at a configurable point,
    /// for exercising the engine's unwind paths.
    struct RefusingArbitrator {
        accept_disputes: bool,
        opened: Mutex<u64>,
    }

    impl RefusingArbitrator {
        fn refusing_disputes() -> Self {
            Self {
                accept_disputes: false,
                opened: Mutex::new(0),
            }
        }

        fn refusing_appeals() -> Self {
            Self {
                accept_disputes: true,
                opened: Mutex::new(0),
            }
        }
    }

    impl ArbitratorPort for RefusingArbitrator {
        fn arbitration_cost(&self) -> NativeAmount {
            NativeAmount::new(FEE)
        }

        fn appeal_cost(&self) -> NativeAmount {
            NativeAmount::new(FEE)
        }

        fn create_dispute(
            &self,
            fee: NativeAmount,
        ) -> Result<ArbitratorDisputeId, ArbitratorError> {
            if !self.accept_disputes {
                return Err(ArbitratorError::FeeTooLow {
                    paid: fee,
                    required: NativeAmount::new(2 * FEE),
                });
            }
            let mut opened = self.opened.lock();
            let id = ArbitratorDisputeId::new(*opened);
            *opened += 1;
            Ok(id)
        }

        fn appeal(
            &self,
            dispute: ArbitratorDisputeId,
            _fee: NativeAmount,
        ) -> Result<(), ArbitratorError> {
            Err(ArbitratorError::InvalidDisputeState {
                dispute,
                operation: "appeal",
            })
        }

        fn appeal_window(&self, _dispute: ArbitratorDisputeId) -> Duration {
            Duration::seconds(WINDOW)
        }
    }

    fn ports_with(
        arbitrator: Arc<dyn ArbitratorPort>,
    ) -> (Arc<InMemoryAssetLedger>, Arc<InMemoryBank>, EscrowEngine) {
        let ledger = Arc::new(InMemoryAssetLedger::new());
        let bank = Arc::new(InMemoryBank::new());
        let engine = EscrowEngine::new(
            ledger.clone(),
            bank.clone(),
            arbitrator,
            account("arbitrator"),
        );
        (ledger, bank, engine)
    }

    /// Escrow one transaction and register one claim from "receiver".
    fn seed_claim(
        ledger: &InMemoryAssetLedger,
        bank: &InMemoryBank,
        engine: &EscrowEngine,
        t0: DateTime<Utc>,
    ) -> ClaimId {
        let sender = account("sender");
        ledger.mint(&asset(), &sender, TokenAmount::new(AMOUNT));
        ledger.approve(&asset(), &sender, TokenAmount::new(AMOUNT));
        let tx = engine
            .create_transaction(
                sender,
                asset(),
                TokenAmount::new(AMOUNT),
                NativeAmount::new(DEPOSIT),
                Duration::seconds(TIMEOUT),
                Duration::seconds(PERIOD),
                "/ipfs/X",
                t0,
            )
            .unwrap();
        let receiver = account("receiver");
        bank.deposit(&receiver, NativeAmount::new(1_000));
        engine
            .claim(tx, receiver, NativeAmount::new(PAYMENT), t0)
            .unwrap()
    }

    impl Harness {
        fn fund_sender(&self, name: &str) -> AccountId {
            let sender = account(name);
            self.ledger.mint(&asset(), &sender, TokenAmount::new(AMOUNT));
            self.ledger
                .approve(&asset(), &sender, TokenAmount::new(AMOUNT));
            sender
        }

        fn fund_native(&self, name: &str, amount: u128) -> AccountId {
            let who = account(name);
            self.bank.deposit(&who, NativeAmount::new(amount));
            who
        }

        fn escrow(&self, sender: &AccountId) -> TransactionId {
            self.engine
                .create_transaction(
                    sender.clone(),
                    asset(),
                    TokenAmount::new(AMOUNT),
                    NativeAmount::new(DEPOSIT),
                    Duration::seconds(TIMEOUT),
                    Duration::seconds(PERIOD),
                    "/ipfs/X",
                    self.t0,
                )
                .unwrap()
        }
    }

    #[test]
    fn create_transaction_escrows_the_amount() {
        let h = harness();
        let sender = h.fund_sender("sender");
        let tx = h.escrow(&sender);

        assert_eq!(h.ledger.balance_of(&asset(), &sender), TokenAmount::ZERO);
        assert_eq!(h.ledger.custody_balance(&asset()), TokenAmount::new(AMOUNT));
        let record = h.engine.transactions(tx).unwrap();
        assert_eq!(record.amount, TokenAmount::new(AMOUNT));
        assert!(!record.disbursed);
    }

    #[test]
    fn zero_amount_rejected_before_any_transfer() {
        let h = harness();
        let sender = h.fund_sender("sender");
        let err = h
            .engine
            .create_transaction(
                sender.clone(),
                asset(),
                TokenAmount::ZERO,
                NativeAmount::new(DEPOSIT),
                Duration::seconds(TIMEOUT),
                Duration::seconds(PERIOD),
                "",
                h.t0,
            )
            .unwrap_err();
        assert!(matches!(err, EscrowError::ZeroAmount));
        assert_eq!(
            h.ledger.balance_of(&asset(), &sender),
            TokenAmount::new(AMOUNT)
        );
    }

    #[test]
    fn claim_requires_deposit_plus_live_fee() {
        let h = harness();
        let sender = h.fund_sender("sender");
        let tx = h.escrow(&sender);
        let receiver = h.fund_native("receiver", 1_000);

        let err = h
            .engine
            .claim(tx, receiver.clone(), NativeAmount::new(PAYMENT - 1), h.t0)
            .unwrap_err();
        assert!(matches!(err, EscrowError::InsufficientClaimPayment { .. }));
        assert_eq!(h.bank.balance_of(&receiver), NativeAmount::new(1_000));

        let claim = h
            .engine
            .claim(tx, receiver.clone(), NativeAmount::new(PAYMENT), h.t0)
            .unwrap();
        assert_eq!(h.bank.balance_of(&receiver), NativeAmount::new(880));
        assert_eq!(h.bank.custody_balance(), NativeAmount::new(PAYMENT));
        let record = h.engine.claims(claim).unwrap();
        assert_eq!(record.fee_snapshot, NativeAmount::new(FEE));
        assert_eq!(h.engine.transactions(tx).unwrap().running_claim_count, 1);
    }

    #[test]
    fn pay_waits_out_the_challenge_period() {
        let h = harness();
        let sender = h.fund_sender("sender");
        let tx = h.escrow(&sender);
        let receiver = h.fund_native("receiver", 1_000);
        let claim = h
            .engine
            .claim(tx, receiver.clone(), NativeAmount::new(PAYMENT), h.t0)
            .unwrap();

        let early = h.t0 + Duration::seconds(PERIOD - 1);
        let err = h.engine.pay(claim, early).unwrap_err();
        assert!(matches!(err, EscrowError::ChallengePeriodNotElapsed { .. }));

        let due = h.t0 + Duration::seconds(PERIOD);
        h.engine.pay(claim, due).unwrap();
        assert_eq!(
            h.ledger.balance_of(&asset(), &receiver),
            TokenAmount::new(AMOUNT)
        );
        assert_eq!(h.bank.balance_of(&receiver), NativeAmount::new(1_000));
        assert_eq!(h.bank.custody_balance(), NativeAmount::ZERO);
        assert!(h.engine.transactions(tx).unwrap().disbursed);
        assert_eq!(
            h.engine.claims(claim).unwrap().status,
            ClaimStatus::Resolved
        );
    }

    #[test]
    fn refund_blocked_by_running_claim_then_allowed() {
        let h = harness();
        let sender = h.fund_sender("sender");
        let tx = h.escrow(&sender);
        let receiver = h.fund_native("receiver", 1_000);

        let early = h.t0 + Duration::seconds(TIMEOUT - 1);
        assert!(matches!(
            h.engine.refund(tx, early).unwrap_err(),
            EscrowError::TimeoutNotElapsed { .. }
        ));

        let claim = h
            .engine
            .claim(tx, receiver, NativeAmount::new(PAYMENT), h.t0)
            .unwrap();
        let due = h.t0 + Duration::seconds(TIMEOUT);
        assert!(matches!(
            h.engine.refund(tx, due).unwrap_err(),
            EscrowError::ClaimsStillRunning { running: 1, .. }
        ));

        // Claim pays out, then refund is permanently closed by disbursal.
        h.engine.pay(claim, h.t0 + Duration::seconds(PERIOD)).unwrap();
        assert!(matches!(
            h.engine.refund(tx, due).unwrap_err(),
            EscrowError::AlreadyDisbursed(_)
        ));
    }

    #[test]
    fn refund_returns_escrow_to_sender() {
        let h = harness();
        let sender = h.fund_sender("sender");
        let tx = h.escrow(&sender);

        h.engine
            .refund(tx, h.t0 + Duration::seconds(TIMEOUT))
            .unwrap();
        assert_eq!(
            h.ledger.balance_of(&asset(), &sender),
            TokenAmount::new(AMOUNT)
        );
        assert!(h.engine.transactions(tx).unwrap().disbursed);
    }

    #[test]
    fn challenge_builds_the_stake_pool() {
        let h = harness();
        let sender = h.fund_sender("sender");
        let tx = h.escrow(&sender);
        let receiver = h.fund_native("receiver", 1_000);
        let challenger = h.fund_native("challenger", 1_000);
        let claim = h
            .engine
            .claim(tx, receiver, NativeAmount::new(PAYMENT), h.t0)
            .unwrap();

        let dispute = h
            .engine
            .challenge_claim(claim, challenger.clone(), NativeAmount::new(PAYMENT), h.t0)
            .unwrap();

        let record = h.engine.disputes(dispute).unwrap();
        assert_eq!(record.status, DisputeStatus::Open);
        assert_eq!(record.claimant_stake, NativeAmount::new(PAYMENT));
        assert_eq!(record.challenger_stake, NativeAmount::new(PAYMENT - FEE));
        assert_eq!(h.engine.claims(claim).unwrap().status, ClaimStatus::Challenged);
        // Fee left custody for the arbitrator's account.
        assert_eq!(
            h.bank.balance_of(&account("arbitrator")),
            NativeAmount::new(FEE)
        );
        assert_eq!(h.arbitrator.fees_collected(), NativeAmount::new(FEE));
        assert_eq!(
            h.bank.custody_balance(),
            NativeAmount::new(PAYMENT + PAYMENT - FEE)
        );

        // A challenged claim can no longer be paid.
        let due = h.t0 + Duration::seconds(PERIOD);
        assert!(matches!(
            h.engine.pay(claim, due).unwrap_err(),
            EscrowError::ClaimNotPending { .. }
        ));
    }

    #[test]
    fn ruling_is_provisional_until_the_window_passes() {
        let h = harness();
        let sender = h.fund_sender("sender");
        let tx = h.escrow(&sender);
        let receiver = h.fund_native("receiver", 1_000);
        let challenger = h.fund_native("challenger", 1_000);
        let claim = h
            .engine
            .claim(tx, receiver, NativeAmount::new(PAYMENT), h.t0)
            .unwrap();
        let dispute = h
            .engine
            .challenge_claim(claim, challenger.clone(), NativeAmount::new(PAYMENT), h.t0)
            .unwrap();
        let arb = h.engine.disputes(dispute).unwrap().arbitrator_dispute;

        let event = h.arbitrator.give_ruling(arb, Ruling::ForChallenger).unwrap();
        h.engine.receive_ruling(event, h.t0).unwrap();
        let record = h.engine.disputes(dispute).unwrap();
        assert_eq!(record.status, DisputeStatus::Appealed);
        assert_eq!(record.appeal_deadline, Some(h.t0 + Duration::seconds(WINDOW)));
        // No balances moved yet.
        assert_eq!(h.bank.balance_of(&challenger), NativeAmount::new(880));

        // Re-reporting inside the window does not finalize.
        h.engine
            .receive_ruling(event, h.t0 + Duration::seconds(WINDOW - 1))
            .unwrap();
        assert_eq!(
            h.engine.disputes(dispute).unwrap().status,
            DisputeStatus::Appealed
        );

        // At the deadline the ruling executes: the challenger takes the pool.
        h.engine
            .receive_ruling(event, h.t0 + Duration::seconds(WINDOW))
            .unwrap();
        let record = h.engine.disputes(dispute).unwrap();
        assert_eq!(record.status, DisputeStatus::Finalized);
        assert_eq!(
            h.bank.balance_of(&challenger),
            NativeAmount::new(880 + PAYMENT + PAYMENT - FEE)
        );
        assert!(!h.engine.transactions(tx).unwrap().disbursed);

        // Further reports are ignored without error.
        h.engine
            .receive_ruling(event, h.t0 + Duration::seconds(WINDOW + 100))
            .unwrap();
    }

    #[test]
    fn unknown_arbitrator_handle_is_rejected() {
        let h = harness();
        let err = h
            .engine
            .receive_ruling(
                RulingEvent {
                    dispute: ArbitratorDisputeId::new(9),
                    ruling: Ruling::ForClaimant,
                },
                h.t0,
            )
            .unwrap_err();
        assert!(matches!(err, EscrowError::UnknownArbitratorDispute(_)));
    }

    #[test]
    fn appeal_restricted_to_parties_and_window() {
        let h = harness();
        let sender = h.fund_sender("sender");
        let tx = h.escrow(&sender);
        let receiver = h.fund_native("receiver", 1_000);
        let challenger = h.fund_native("challenger", 1_000);
        let outsider = h.fund_native("outsider", 1_000);
        let claim = h
            .engine
            .claim(tx, receiver.clone(), NativeAmount::new(PAYMENT), h.t0)
            .unwrap();
        let dispute = h
            .engine
            .challenge_claim(claim, challenger, NativeAmount::new(PAYMENT), h.t0)
            .unwrap();
        let arb = h.engine.disputes(dispute).unwrap().arbitrator_dispute;

        // No ruling yet, nothing to appeal.
        assert!(matches!(
            h.engine
                .appeal(claim, receiver.clone(), NativeAmount::new(FEE), h.t0)
                .unwrap_err(),
            EscrowError::InvalidDisputeState { .. }
        ));

        let event = h.arbitrator.give_ruling(arb, Ruling::ForChallenger).unwrap();
        h.engine.receive_ruling(event, h.t0).unwrap();

        assert!(matches!(
            h.engine
                .appeal(claim, outsider, NativeAmount::new(FEE), h.t0)
                .unwrap_err(),
            EscrowError::NotDisputeParty { .. }
        ));
        assert!(matches!(
            h.engine
                .appeal(claim, receiver.clone(), NativeAmount::new(FEE - 1), h.t0)
                .unwrap_err(),
            EscrowError::InsufficientAppealPayment { .. }
        ));

        h.engine
            .appeal(
                claim,
                receiver.clone(),
                NativeAmount::new(FEE),
                h.t0 + Duration::seconds(WINDOW - 1),
            )
            .unwrap();
        let record = h.engine.disputes(dispute).unwrap();
        assert_eq!(record.appeal_count, 1);
        assert_eq!(record.ruling, None);
        assert_eq!(
            record.appeal_deadline,
            Some(h.t0 + Duration::seconds(WINDOW - 1 + WINDOW))
        );

        // A second appeal needs a fresh provisional ruling first.
        let late = h.t0 + Duration::seconds(WINDOW - 1 + WINDOW);
        assert!(matches!(
            h.engine
                .appeal(claim, receiver, NativeAmount::new(FEE), late)
                .unwrap_err(),
            EscrowError::AppealWindowClosed { .. }
        ));
    }

    #[test]
    fn concurrent_claims_leave_one_payout() {
        let h = harness();
        let sender = h.fund_sender("sender");
        let tx = h.escrow(&sender);
        let first = h.fund_native("first", 1_000);
        let second = h.fund_native("second", 1_000);

        let claim_a = h
            .engine
            .claim(tx, first.clone(), NativeAmount::new(PAYMENT), h.t0)
            .unwrap();
        let claim_b = h
            .engine
            .claim(tx, second.clone(), NativeAmount::new(PAYMENT), h.t0)
            .unwrap();
        assert_eq!(h.engine.transactions(tx).unwrap().running_claim_count, 2);

        let due = h.t0 + Duration::seconds(PERIOD);
        h.engine.pay(claim_a, due).unwrap();
        assert!(matches!(
            h.engine.pay(claim_b, due).unwrap_err(),
            EscrowError::AlreadyDisbursed(_)
        ));

        // The losing claimant recovers their stake through withdrawal.
        assert!(matches!(
            h.engine.withdraw_claim(claim_a, due).unwrap_err(),
            EscrowError::ClaimNotPending { .. }
        ));
        h.engine.withdraw_claim(claim_b, due).unwrap();
        assert_eq!(h.bank.balance_of(&second), NativeAmount::new(1_000));
        assert_eq!(h.bank.custody_balance(), NativeAmount::ZERO);
        assert_eq!(h.engine.transactions(tx).unwrap().running_claim_count, 0);
    }

    #[test]
    fn withdraw_requires_a_disbursed_transaction() {
        let h = harness();
        let sender = h.fund_sender("sender");
        let tx = h.escrow(&sender);
        let receiver = h.fund_native("receiver", 1_000);
        let claim = h
            .engine
            .claim(tx, receiver, NativeAmount::new(PAYMENT), h.t0)
            .unwrap();

        assert!(matches!(
            h.engine.withdraw_claim(claim, h.t0).unwrap_err(),
            EscrowError::TransactionStillOpen(_)
        ));
    }

    #[test]
    fn claim_on_disbursed_transaction_rejected() {
        let h = harness();
        let sender = h.fund_sender("sender");
        let tx = h.escrow(&sender);
        h.engine
            .refund(tx, h.t0 + Duration::seconds(TIMEOUT))
            .unwrap();

        let receiver = h.fund_native("receiver", 1_000);
        let err = h
            .engine
            .claim(tx, receiver, NativeAmount::new(PAYMENT), h.t0)
            .unwrap_err();
        assert!(matches!(err, EscrowError::AlreadyDisbursed(_)));
    }

    #[test]
    fn challenge_fee_tracks_the_live_arbitration_price() {
        let h = harness();
        let sender = h.fund_sender("sender");
        let tx = h.escrow(&sender);
        let receiver = h.fund_native("receiver", 1_000);
        let challenger = h.fund_native("challenger", 1_000);
        let claim = h
            .engine
            .claim(tx, receiver, NativeAmount::new(PAYMENT), h.t0)
            .unwrap();
        assert_eq!(
            h.engine.claims(claim).unwrap().fee_snapshot,
            NativeAmount::new(FEE)
        );

        h.arbitrator.set_arbitration_price(NativeAmount::new(FEE + 10));

        // The fee level at claim time no longer covers a challenge.
        let err = h
            .engine
            .challenge_claim(claim, challenger.clone(), NativeAmount::new(PAYMENT), h.t0)
            .unwrap_err();
        assert!(matches!(
            err,
            EscrowError::InsufficientChallengePayment { required, .. }
                if required == NativeAmount::new(DEPOSIT + FEE + 10)
        ));

        // Paying the live fee opens the dispute.
        let dispute = h
            .engine
            .challenge_claim(
                claim,
                challenger.clone(),
                NativeAmount::new(PAYMENT + 10),
                h.t0,
            )
            .unwrap();
        let record = h.engine.disputes(dispute).unwrap();
        assert_eq!(record.challenger_stake, NativeAmount::new(PAYMENT - FEE));
        assert_eq!(
            h.bank.balance_of(&account("arbitrator")),
            NativeAmount::new(FEE + 10)
        );
        assert_eq!(h.arbitrator.fees_collected(), NativeAmount::new(FEE + 10));
    }

    #[test]
    fn failed_payout_leaves_no_stale_receipts() {
        let h = harness();
        let sender = h.fund_sender("sender");
        let tx = h.escrow(&sender);
        let receiver = h.fund_native("receiver", 1_000);
        let claim = h
            .engine
            .claim(tx, receiver.clone(), NativeAmount::new(PAYMENT), h.t0)
            .unwrap();

        // Drain asset custody behind the engine's back so disbursal fails.
        h.ledger
            .push(&asset(), &account("drain"), TokenAmount::new(AMOUNT))
            .unwrap();

        let due = h.t0 + Duration::seconds(PERIOD);
        let err = h.engine.pay(claim, due).unwrap_err();
        assert!(matches!(err, EscrowError::AssetTransferFailed(_)));

        // The deposit return was unwound and its receipt with it.
        assert_eq!(h.bank.custody_balance(), NativeAmount::new(PAYMENT));
        assert_eq!(h.bank.balance_of(&receiver), NativeAmount::new(880));
        assert!(h.engine.receipts().is_empty());
        assert_eq!(h.engine.claims(claim).unwrap().status, ClaimStatus::Pending);
    }

    #[test]
    fn failed_dispute_creation_unwinds_the_challenge() {
        let (ledger, bank, engine) = ports_with(Arc::new(RefusingArbitrator::refusing_disputes()));
        let t0 = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let claim = seed_claim(&ledger, &bank, &engine, t0);

        let challenger = account("challenger");
        bank.deposit(&challenger, NativeAmount::new(1_000));
        let err = engine
            .challenge_claim(claim, challenger.clone(), NativeAmount::new(PAYMENT), t0)
            .unwrap_err();
        assert!(matches!(err, EscrowError::ArbitratorCallFailed(_)));

        // Every transfer rolled back and the forwarded-fee receipt with it.
        assert_eq!(bank.balance_of(&challenger), NativeAmount::new(1_000));
        assert_eq!(bank.balance_of(&account("arbitrator")), NativeAmount::ZERO);
        assert_eq!(bank.custody_balance(), NativeAmount::new(PAYMENT));
        assert!(engine.receipts().is_empty());
        // The claim stays challengeable.
        assert_eq!(engine.claims(claim).unwrap().status, ClaimStatus::Pending);
    }

    #[test]
    fn failed_appeal_call_unwinds_the_appellant() {
        let (ledger, bank, engine) = ports_with(Arc::new(RefusingArbitrator::refusing_appeals()));
        let t0 = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let claim = seed_claim(&ledger, &bank, &engine, t0);
        let receiver = account("receiver");

        let challenger = account("challenger");
        bank.deposit(&challenger, NativeAmount::new(1_000));
        let dispute = engine
            .challenge_claim(claim, challenger, NativeAmount::new(PAYMENT), t0)
            .unwrap();
        let arb = engine.disputes(dispute).unwrap().arbitrator_dispute;
        engine
            .receive_ruling(
                RulingEvent {
                    dispute: arb,
                    ruling: Ruling::ForChallenger,
                },
                t0,
            )
            .unwrap();

        let err = engine
            .appeal(
                claim,
                receiver.clone(),
                NativeAmount::new(FEE),
                t0 + Duration::seconds(1),
            )
            .unwrap_err();
        assert!(matches!(err, EscrowError::ArbitratorCallFailed(_)));

        // Only the challenge's forwarded fee remains on record.
        assert_eq!(bank.balance_of(&receiver), NativeAmount::new(880));
        assert_eq!(
            bank.balance_of(&account("arbitrator")),
            NativeAmount::new(FEE)
        );
        let receipts = engine.receipts();
        assert_eq!(receipts.len(), 1);
        assert_eq!(receipts[0].kind, PayoutKind::FeeForwarded);
        let record = engine.disputes(dispute).unwrap();
        assert_eq!(record.appeal_count, 0);
        assert_eq!(record.ruling, Some(Ruling::ForChallenger));
    }

    #[test]
    fn receipts_record_every_release() {
        let h = harness();
        let sender = h.fund_sender("sender");
        let tx = h.escrow(&sender);
        let receiver = h.fund_native("receiver", 1_000);
        let claim = h
            .engine
            .claim(tx, receiver, NativeAmount::new(PAYMENT), h.t0)
            .unwrap();
        h.engine.pay(claim, h.t0 + Duration::seconds(PERIOD)).unwrap();

        let receipts = h.engine.receipts();
        assert_eq!(receipts.len(), 2);
        assert!(receipts
            .iter()
            .any(|r| r.kind == PayoutKind::DepositReturned
                && r.native_amount == Some(NativeAmount::new(PAYMENT))));
        assert!(receipts
            .iter()
            .any(|r| r.kind == PayoutKind::EscrowDisbursed
                && r.token_amount == Some(TokenAmount::new(AMOUNT))));
    }
}
