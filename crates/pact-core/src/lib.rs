//! # pact-core — Foundational Types
//!
//! Shared primitives for the Pact escrow protocol:
//!
//! - **Identifiers** ([`id`]): integer-handle newtypes for transactions,
//!   claims, and disputes. Handles are assigned sequentially from
//!   append-only tables and never reused.
//!
//! - **Accounts** ([`account`]): validated newtypes for account and asset
//!   references.
//!
//! - **Amounts** ([`amount`]): checked monetary arithmetic over base units.
//!   The escrowed asset ([`TokenAmount`]) and the deposit/fee currency
//!   ([`NativeAmount`]) are distinct types — you cannot pay an arbitration
//!   fee with escrowed tokens.
//!
//! - **Errors** ([`error`]): validation error hierarchy.

pub mod account;
pub mod amount;
pub mod error;
pub mod id;

pub use account::{AccountId, AssetId};
pub use amount::{NativeAmount, TokenAmount};
pub use error::ValidationError;
pub use id::{ArbitratorDisputeId, ClaimId, DisputeId, TransactionId};
