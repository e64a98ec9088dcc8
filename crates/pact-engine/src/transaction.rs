//! # Transaction Ledger Records
//!
//! A transaction is the escrow of a fixed asset amount by a sender,
//! together with the parameters every later claim against it inherits:
//! the claim deposit, the challenge period, and the payment timeout after
//! which the sender may reclaim an unclaimed escrow.
//!
//! ## Security Invariant
//!
//! `disbursed` flips to `true` exactly once, and only the payout engine
//! flips it. Every path that moves the escrowed amount out of custody
//! checks the flag first.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use pact_core::{AccountId, AssetId, NativeAmount, TokenAmount, TransactionId};

/// An escrowed transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Ledger handle, assigned sequentially at creation.
    pub id: TransactionId,
    /// The account that escrowed the amount and may be refunded.
    pub sender: AccountId,
    /// The asset held in escrow.
    pub asset: AssetId,
    /// The escrowed amount.
    pub amount: TokenAmount,
    /// The deposit every claim against this transaction must post, on top
    /// of the live arbitration fee.
    pub claim_deposit: NativeAmount,
    /// Seconds after `created_at` before the sender may reclaim an
    /// undisbursed escrow with no running claims.
    pub payment_timeout_secs: i64,
    /// Seconds a claim must survive unchallenged before it can be paid.
    pub challenge_period_secs: i64,
    /// Off-protocol description of what the escrow is for.
    pub meta_evidence: String,
    /// When the escrow was created.
    pub created_at: DateTime<Utc>,
    /// Claims neither resolved nor withdrawn. Blocks refund while nonzero.
    pub running_claim_count: u32,
    /// Whether the escrowed amount has left custody.
    pub disbursed: bool,
}

impl Transaction {
    /// The instant the sender's refund becomes available.
    pub fn refundable_at(&self) -> DateTime<Utc> {
        self.created_at + Duration::seconds(self.payment_timeout_secs)
    }

    /// Whether the payment timeout has elapsed at `now`.
    pub fn is_refund_due(&self, now: DateTime<Utc>) -> bool {
        now >= self.refundable_at()
    }

    /// The instant a claim created at `claimed_at` becomes payable.
    pub fn payable_at(&self, claimed_at: DateTime<Utc>) -> DateTime<Utc> {
        claimed_at + Duration::seconds(self.challenge_period_secs)
    }
}
