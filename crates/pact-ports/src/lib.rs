//! # pact-ports — External Collaborator Boundary
//!
//! The escrow protocol coordinates three external services it does not
//! implement: the ledger of the escrowed asset, the bank of the native
//! deposit/fee currency, and the arbitrator. This crate defines each as a
//! trait and ships deterministic in-memory implementations for tests and
//! local runs.
//!
//! - **Asset transfer** ([`asset`]): pull the escrowed asset into custody,
//!   push it out. All-or-nothing per call.
//!
//! - **Native transfer** ([`native`]): same contract for the currency that
//!   deposits and fees are paid in.
//!
//! - **Arbitrator** ([`arbitrator`]): fee queries, dispute creation,
//!   appeals, and the [`RulingEvent`] delivery type the coordinator
//!   consumes.

pub mod arbitrator;
pub mod asset;
pub mod native;

pub use arbitrator::{
    AppealableArbitrator, ArbitratorError, ArbitratorPort, Ruling, RulingEvent,
};
pub use asset::{AssetPortError, AssetTransferPort, InMemoryAssetLedger};
pub use native::{InMemoryBank, NativePortError, NativeTransferPort};
