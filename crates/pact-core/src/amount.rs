//! # Monetary Newtypes
//!
//! Checked base-unit arithmetic for the two kinds of value the protocol
//! moves. Amounts are unsigned 128-bit integers in the smallest unit of
//! their currency; there is no floating point anywhere in the money path.
//!
//! [`TokenAmount`] is the escrowed fungible asset. [`NativeAmount`] is the
//! currency that claim deposits, arbitration fees, and appeal fees are paid
//! in. They are distinct types so the escrow principal and the fee
//! bookkeeping cannot be mixed by accident.
//!
//! ## Security Invariant
//!
//! All arithmetic is checked. Overflow and underflow return `None` and are
//! surfaced as errors by callers — a stake pool can never silently wrap.

use serde::{Deserialize, Serialize};

/// Implements the shared arithmetic surface of a base-unit amount.
macro_rules! base_unit_amount {
    ($(#[$doc:meta])* $ty:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default,
            Serialize, Deserialize,
        )]
        pub struct $ty(u128);

        impl $ty {
            /// The zero amount.
            pub const ZERO: Self = Self(0);

            /// Wrap a base-unit quantity.
            pub const fn new(base_units: u128) -> Self {
                Self(base_units)
            }

            /// The raw base-unit quantity.
            pub const fn base_units(&self) -> u128 {
                self.0
            }

            /// Whether this amount is zero.
            pub const fn is_zero(&self) -> bool {
                self.0 == 0
            }

            /// Checked addition.
            pub fn checked_add(self, other: Self) -> Option<Self> {
                self.0.checked_add(other.0).map(Self)
            }

            /// Checked subtraction.
            pub fn checked_sub(self, other: Self) -> Option<Self> {
                self.0.checked_sub(other.0).map(Self)
            }

            /// Saturating subtraction. Used only where a shortfall is
            /// semantically "nothing left", never for conservation math.
            pub fn saturating_sub(self, other: Self) -> Self {
                Self(self.0.saturating_sub(other.0))
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::iter::Sum for $ty {
            fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
                iter.fold(Self::ZERO, |acc, x| {
                    acc.checked_add(x).expect("amount sum overflow")
                })
            }
        }
    };
}

base_unit_amount!(
    /// An amount of the escrowed fungible asset, in base units.
    TokenAmount
);

base_unit_amount!(
    /// An amount of the native deposit/fee currency, in base units.
    NativeAmount
);
