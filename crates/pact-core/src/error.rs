//! # Validation Errors
//!
//! Construction-time failures for the foundational newtypes. These are the
//! only errors this crate produces; protocol-level failures live in
//! `pact-engine`.

use thiserror::Error;

/// Errors from constructing a foundational type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Account reference is empty or has surrounding whitespace.
    #[error("invalid account reference: {0:?}")]
    InvalidAccountId(String),

    /// Asset reference is empty or has surrounding whitespace.
    #[error("invalid asset reference: {0:?}")]
    InvalidAssetId(String),
}
