//! # Identifier Newtypes
//!
//! Integer-handle newtypes for the protocol's persisted tables. Each
//! identifier is a distinct type — you cannot pass a [`ClaimId`] where a
//! [`TransactionId`] is expected.
//!
//! Handles are indices into append-only tables: the ledger assigns them
//! sequentially at creation and never reuses them. [`ArbitratorDisputeId`]
//! is different in kind — it is issued by the external arbitrator and is
//! opaque to the protocol.

use serde::{Deserialize, Serialize};

/// Implements the shared surface of an integer table handle.
macro_rules! table_handle {
    ($(#[$doc:meta])* $ty:ident, $prefix:literal) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        pub struct $ty(u64);

        impl $ty {
            /// Wrap a raw table index.
            pub fn new(index: u64) -> Self {
                Self(index)
            }

            /// The raw table index.
            pub fn index(&self) -> u64 {
                self.0
            }
        }

        impl From<u64> for $ty {
            fn from(index: u64) -> Self {
                Self(index)
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!($prefix, ":{}"), self.0)
            }
        }
    };
}

table_handle!(
    /// A handle into the transaction ledger.
    TransactionId,
    "tx"
);

table_handle!(
    /// A handle into the claim registry.
    ClaimId,
    "claim"
);

table_handle!(
    /// A handle into the dispute coordinator's table.
    DisputeId,
    "dispute"
);

table_handle!(
    /// A dispute handle issued by the external arbitrator.
    ///
    /// Distinct from [`DisputeId`]: the coordinator maps between the two and
    /// never assumes the arbitrator's numbering matches its own.
    ArbitratorDisputeId,
    "arb-dispute"
);
