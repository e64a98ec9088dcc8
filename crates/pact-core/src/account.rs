//! # Account and Asset Newtypes
//!
//! Validated references to external parties and assets. The protocol never
//! interprets these beyond equality — custody and balance semantics live
//! behind the transfer ports — but it refuses to construct empty or
//! whitespace-padded references, which would make two spellings of the same
//! party silently distinct.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Routes deserialization of a validating string newtype through its `new()`
/// constructor so invalid values are rejected at the boundary, not stored.
macro_rules! impl_validating_deserialize {
    ($ty:ident) => {
        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let raw = String::deserialize(deserializer)?;
                Self::new(raw).map_err(serde::de::Error::custom)
            }
        }
    };
}

/// A reference to a party that can hold and transfer value.
///
/// Opaque to the protocol: an address, an IBAN, a ledger key — whatever the
/// transfer ports resolve. Must be non-empty with no surrounding whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct AccountId(String);

impl_validating_deserialize!(AccountId);

impl AccountId {
    /// Create an account reference, validating shape.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidAccountId`] if the string is empty
    /// or has leading/trailing whitespace.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let s = value.into();
        if s.is_empty() || s.trim() != s {
            return Err(ValidationError::InvalidAccountId(s));
        }
        Ok(Self(s))
    }

    /// The reference as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A reference to the fungible asset held in escrow.
///
/// Same validation rules as [`AccountId`]. One transaction escrows exactly
/// one asset; the asset ledger is the authority on what the reference means.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct AssetId(String);

impl_validating_deserialize!(AssetId);

impl AssetId {
    /// Create an asset reference, validating shape.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidAssetId`] if the string is empty
    /// or has leading/trailing whitespace.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let s = value.into();
        if s.is_empty() || s.trim() != s {
            return Err(ValidationError::InvalidAssetId(s));
        }
        Ok(Self(s))
    }

    /// The reference as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AssetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_id_accepts_plain_references() {
        assert!(AccountId::new("0xabc123").is_ok());
        assert!(AccountId::new("alice").is_ok());
    }

    #[test]
    fn account_id_rejects_empty() {
        assert!(AccountId::new("").is_err());
    }

    #[test]
    fn account_id_rejects_padded() {
        assert!(AccountId::new(" alice").is_err());
        assert!(AccountId::new("alice ").is_err());
        assert!(AccountId::new("\tbob").is_err());
    }

    #[test]
    fn asset_id_rejects_empty() {
        assert!(AssetId::new("").is_err());
    }

    #[test]
    fn deserialization_validates() {
        let ok: Result<AccountId, _> = serde_json::from_str("\"alice\"");
        assert!(ok.is_ok());
        let bad: Result<AccountId, _> = serde_json::from_str("\"\"");
        assert!(bad.is_err());
        let padded: Result<AssetId, _> = serde_json::from_str("\" erc20\"");
        assert!(padded.is_err());
    }

    #[test]
    fn display_is_transparent() {
        let id = AccountId::new("carol").unwrap();
        assert_eq!(format!("{id}"), "carol");
        assert_eq!(id.as_str(), "carol");
    }
}
