//! # Native Transfer Port
//!
//! Deposit and fee flows are paid in a native currency distinct from the
//! escrowed asset. The port mirrors [`AssetTransferPort`]: `pull` moves
//! native funds from a payer into custody, `push` pays them out.
//!
//! [`AssetTransferPort`]: crate::asset::AssetTransferPort

use dashmap::DashMap;
use parking_lot::Mutex;
use thiserror::Error;

use pact_core::{AccountId, NativeAmount};

/// Failures reported by a native currency bank.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NativePortError {
    /// The payer's balance cannot cover the payment.
    #[error("account {account} holds {held}, needs {needed}")]
    InsufficientBalance {
        /// The account being debited.
        account: AccountId,
        /// The balance on record.
        held: NativeAmount,
        /// The amount the payment requires.
        needed: NativeAmount,
    },

    /// Custody cannot cover an outbound push. Indicates an accounting
    /// disagreement between escrow and the bank; halt and audit.
    #[error("native custody holds {held}, needs {needed}")]
    CustodyShortfall {
        /// Custody's balance on record.
        held: NativeAmount,
        /// The amount the push requires.
        needed: NativeAmount,
    },
}

/// Moves native currency between external accounts and custody.
///
/// All-or-nothing per call, like the asset port.
pub trait NativeTransferPort: Send + Sync {
    /// Pull `amount` from `from` into custody.
    fn pull(&self, from: &AccountId, amount: NativeAmount) -> Result<(), NativePortError>;

    /// Push `amount` from custody to `to`.
    fn push(&self, to: &AccountId, amount: NativeAmount) -> Result<(), NativePortError>;
}

// ---------------------------------------------------------------------------
// In-memory implementation
// ---------------------------------------------------------------------------

/// An in-memory native currency bank.
///
/// Balances per account plus a single custody pot. Intended for tests and
/// local runs.
#[derive(Default)]
pub struct InMemoryBank {
    balances: DashMap<AccountId, NativeAmount>,
    custody: Mutex<NativeAmount>,
}

impl InMemoryBank {
    /// Create an empty bank.
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit `amount` to `account` out of thin air.
    pub fn deposit(&self, account: &AccountId, amount: NativeAmount) {
        let mut entry = self
            .balances
            .entry(account.clone())
            .or_insert(NativeAmount::ZERO);
        *entry = entry
            .checked_add(amount)
            .expect("deposit overflow in test bank");
    }

    /// The balance of `account`.
    pub fn balance_of(&self, account: &AccountId) -> NativeAmount {
        self.balances
            .get(account)
            .map(|v| *v)
            .unwrap_or(NativeAmount::ZERO)
    }

    /// The native funds currently held in custody.
    pub fn custody_balance(&self) -> NativeAmount {
        *self.custody.lock()
    }
}

impl NativeTransferPort for InMemoryBank {
    fn pull(&self, from: &AccountId, amount: NativeAmount) -> Result<(), NativePortError> {
        let held = self.balance_of(from);
        if held < amount {
            return Err(NativePortError::InsufficientBalance {
                account: from.clone(),
                held,
                needed: amount,
            });
        }
        if let Some(mut balance) = self.balances.get_mut(from) {
            *balance = balance.saturating_sub(amount);
        }
        let mut custody = self.custody.lock();
        *custody = custody
            .checked_add(amount)
            .expect("custody overflow in test bank");
        Ok(())
    }

    fn push(&self, to: &AccountId, amount: NativeAmount) -> Result<(), NativePortError> {
        let mut custody = self.custody.lock();
        if *custody < amount {
            return Err(NativePortError::CustodyShortfall {
                held: *custody,
                needed: amount,
            });
        }
        *custody = custody.saturating_sub(amount);
        drop(custody);

        let mut balance = self
            .balances
            .entry(to.clone())
            .or_insert(NativeAmount::ZERO);
        *balance = balance
            .checked_add(amount)
            .expect("balance overflow in test bank");
        Ok(())
    }
}
