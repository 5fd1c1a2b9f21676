//! Participant identities.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::crypto::hash_data;

/// An opaque 20-byte participant identity.
///
/// Owners and miners are identified by these handles. The registry never
/// interprets them; key management and authentication live outside the
/// core. `Identity::derive` gives a deterministic identity for a label,
/// which the CLI and tests use in place of real key material.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity([u8; 20]);

impl Identity {
    /// The zero identity (no owner / burn)
    pub const ZERO: Self = Self([0u8; 20]);

    /// Create an identity from raw bytes
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Derive an identity from an arbitrary label.
    ///
    /// Identity = BLAKE3(label)[0..20] (20 bytes, similar to Ethereum)
    #[must_use]
    pub fn derive(label: &[u8]) -> Self {
        let hash = hash_data(label);
        let mut id = [0u8; 20];
        id.copy_from_slice(&hash.as_bytes()[..20]);
        Self(id)
    }

    /// Get the underlying bytes
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Convert to hex string with 0x prefix
    #[must_use]
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// Parse from hex string (with or without 0x prefix)
    ///
    /// # Errors
    /// Returns error if hex is invalid or wrong length
    pub fn from_hex(s: &str) -> Result<Self, IdentityError> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s).map_err(|_| IdentityError::InvalidHex)?;

        if bytes.len() != 20 {
            return Err(IdentityError::InvalidLength(bytes.len()));
        }

        let mut arr = [0u8; 20];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }

    /// Check if this is the zero/burn identity
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identity({})", self.to_hex())
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Identity parsing errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum IdentityError {
    /// Invalid hex encoding
    #[error("invalid hex encoding")]
    InvalidHex,
    /// Invalid identity length
    #[error("invalid identity length: expected 20 bytes, got {0}")]
    InvalidLength(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_deterministic() {
        let a = Identity::derive(b"alice");
        assert_eq!(a, Identity::derive(b"alice"));
        assert_ne!(a, Identity::derive(b"bob"));
        assert!(!a.is_zero());
    }

    #[test]
    fn test_hex_roundtrip() {
        let id = Identity::derive(b"carol");
        let parsed = Identity::from_hex(&id.to_hex()).unwrap();
        assert_eq!(id, parsed);

        // 0x prefix is optional
        let bare = id.to_hex().trim_start_matches("0x").to_string();
        assert_eq!(id, Identity::from_hex(&bare).unwrap());

        assert!(Identity::from_hex("0x1234").is_err());
        assert!(Identity::from_hex("not-hex").is_err());
    }

    #[test]
    fn test_zero_identity() {
        assert!(Identity::ZERO.is_zero());
        assert_eq!(Identity::ZERO.to_hex(), format!("0x{}", "00".repeat(20)));
    }
}
