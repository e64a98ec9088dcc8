//! # pact-engine — Escrow With Arbitration
//!
//! The protocol core: a sender escrows an asset amount, receivers claim
//! it by posting a native deposit, claims that survive a challenge period
//! pay out, challenged claims go to an external arbitrator, and rulings
//! divide the challenge stakes.
//!
//! The crate is organized around four parts behind one [`EscrowEngine`]:
//!
//! - [`transaction`]: the append-only ledger of escrows;
//! - [`claim`]: the registry of claims and their deposits;
//! - [`dispute`]: challenged claims, appeal windows, and stake pools;
//! - [`payout`]: the only code that moves value out of custody, with a
//!   receipt log and a single-disbursement guard.
//!
//! External collaborators — the asset ledger, the native bank, and the
//! arbitrator — are injected as the trait objects defined in
//! `pact-ports`. Time is always an explicit parameter.

pub mod claim;
pub mod dispute;
pub mod engine;
pub mod error;
pub mod payout;
pub mod transaction;

pub use claim::{Claim, ClaimStatus};
pub use dispute::{Dispute, DisputeStatus};
pub use engine::EscrowEngine;
pub use error::{ErrorKind, EscrowError};
pub use payout::{NativeRelease, PayoutEngine, PayoutKind, PayoutReceipt};
pub use transaction::Transaction;
