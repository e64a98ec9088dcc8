//! # Asset Transfer Port
//!
//! The escrow-custody primitive for the fungible asset. The port is the
//! custodian: `pull` moves value from an external account into custody,
//! `push` moves it from custody to a recipient. Each call either fully
//! succeeds or leaves balances untouched.

use dashmap::DashMap;
use thiserror::Error;

use pact_core::{AccountId, AssetId, TokenAmount};

/// Failures reported by an asset ledger.
///
/// Every variant carries the account and amounts involved so callers can
/// report the shortfall without a second query.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssetPortError {
    /// The source account's balance cannot cover the transfer.
    #[error("account {account} holds {held} of {asset}, needs {needed}")]
    InsufficientBalance {
        /// The account being debited.
        account: AccountId,
        /// The asset involved.
        asset: AssetId,
        /// The balance on record.
        held: TokenAmount,
        /// The amount the transfer requires.
        needed: TokenAmount,
    },

    /// The source account has not approved custody for the amount.
    #[error("account {account} approved {approved} of {asset} for custody, needs {needed}")]
    InsufficientAllowance {
        /// The account being debited.
        account: AccountId,
        /// The asset involved.
        asset: AssetId,
        /// The allowance on record.
        approved: TokenAmount,
        /// The amount the transfer requires.
        needed: TokenAmount,
    },

    /// Custody itself cannot cover an outbound push.
    ///
    /// Reaching this means escrow accounting and the ledger disagree; it is
    /// reported rather than panicking so the caller can halt and audit.
    #[error("custody holds {held} of {asset}, needs {needed}")]
    CustodyShortfall {
        /// The asset involved.
        asset: AssetId,
        /// Custody's balance on record.
        held: TokenAmount,
        /// The amount the push requires.
        needed: TokenAmount,
    },
}

/// Moves the escrowed asset between external accounts and custody.
///
/// Implementations must be all-or-nothing per call: a returned error means
/// no balance changed.
pub trait AssetTransferPort: Send + Sync {
    /// Pull `amount` of `asset` from `from` into custody.
    fn pull(
        &self,
        asset: &AssetId,
        from: &AccountId,
        amount: TokenAmount,
    ) -> Result<(), AssetPortError>;

    /// Push `amount` of `asset` from custody to `to`.
    fn push(
        &self,
        asset: &AssetId,
        to: &AccountId,
        amount: TokenAmount,
    ) -> Result<(), AssetPortError>;
}

// ---------------------------------------------------------------------------
// In-memory implementation
// ---------------------------------------------------------------------------

/// An in-memory asset ledger with balances and custody allowances.
///
/// Mirrors the approve-then-pull discipline of token ledgers: a pull spends
/// both balance and allowance. Custody is an internal balance per asset.
/// Intended for tests and local runs; all operations are atomic per call.
#[derive(Default)]
pub struct InMemoryAssetLedger {
    balances: DashMap<(AssetId, AccountId), TokenAmount>,
    allowances: DashMap<(AssetId, AccountId), TokenAmount>,
    custody: DashMap<AssetId, TokenAmount>,
}

impl InMemoryAssetLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit `amount` of `asset` to `account` out of thin air.
    pub fn mint(&self, asset: &AssetId, account: &AccountId, amount: TokenAmount) {
        let mut entry = self
            .balances
            .entry((asset.clone(), account.clone()))
            .or_insert(TokenAmount::ZERO);
        *entry = entry
            .checked_add(amount)
            .expect("mint overflow in test ledger");
    }

    /// Approve custody to pull up to `amount` of `asset` from `account`.
    ///
    /// Replaces any previous allowance, like a token `approve`.
    pub fn approve(&self, asset: &AssetId, account: &AccountId, amount: TokenAmount) {
        self.allowances
            .insert((asset.clone(), account.clone()), amount);
    }

    /// The balance of `account` in `asset`.
    pub fn balance_of(&self, asset: &AssetId, account: &AccountId) -> TokenAmount {
        self.balances
            .get(&(asset.clone(), account.clone()))
            .map(|v| *v)
            .unwrap_or(TokenAmount::ZERO)
    }

    /// The amount of `asset` currently held in custody.
    pub fn custody_balance(&self, asset: &AssetId) -> TokenAmount {
        self.custody
            .get(asset)
            .map(|v| *v)
            .unwrap_or(TokenAmount::ZERO)
    }
}

impl AssetTransferPort for InMemoryAssetLedger {
    fn pull(
        &self,
        asset: &AssetId,
        from: &AccountId,
        amount: TokenAmount,
    ) -> Result<(), AssetPortError> {
        let key = (asset.clone(), from.clone());

        // Validate both preconditions before mutating either table.
        let held = self.balance_of(asset, from);
        if held < amount {
            return Err(AssetPortError::InsufficientBalance {
                account: from.clone(),
                asset: asset.clone(),
                held,
                needed: amount,
            });
        }
        let approved = self
            .allowances
            .get(&key)
            .map(|v| *v)
            .unwrap_or(TokenAmount::ZERO);
        if approved < amount {
            return Err(AssetPortError::InsufficientAllowance {
                account: from.clone(),
                asset: asset.clone(),
                approved,
                needed: amount,
            });
        }

        if let Some(mut balance) = self.balances.get_mut(&key) {
            *balance = balance.saturating_sub(amount);
        }
        if let Some(mut allowance) = self.allowances.get_mut(&key) {
            *allowance = allowance.saturating_sub(amount);
        }
        let mut custody = self
            .custody
            .entry(asset.clone())
            .or_insert(TokenAmount::ZERO);
        *custody = custody
            .checked_add(amount)
            .expect("custody overflow in test ledger");
        Ok(())
    }

    fn push(
        &self,
        asset: &AssetId,
        to: &AccountId,
        amount: TokenAmount,
    ) -> Result<(), AssetPortError> {
        let held = self.custody_balance(asset);
        if held < amount {
            return Err(AssetPortError::CustodyShortfall {
                asset: asset.clone(),
                held,
                needed: amount,
            });
        }
        if let Some(mut custody) = self.custody.get_mut(asset) {
            *custody = custody.saturating_sub(amount);
        }
        let mut balance = self
            .balances
            .entry((asset.clone(), to.clone()))
            .or_insert(TokenAmount::ZERO);
        *balance = balance
            .checked_add(amount)
            .expect("balance overflow in test ledger");
        Ok(())
    }
}
