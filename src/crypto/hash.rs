//! 256-bit hash type and hashing helpers.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use super::{CryptoError, CryptoResult};

/// Size of a hash in bytes
pub const HASH_SIZE: usize = 32;

/// A 256-bit hash value.
///
/// Ordering compares the bytes big-endian, i.e. as an unsigned 256-bit
/// integer. Proof verification relies on this: a digest meets a target
/// exactly when `digest < target`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Hash([u8; HASH_SIZE]);

impl Hash {
    /// The all-zero hash
    pub const ZERO: Self = Self([0u8; HASH_SIZE]);

    /// Create a hash from raw bytes
    #[must_use]
    pub const fn from_bytes(bytes: [u8; HASH_SIZE]) -> Self {
        Self(bytes)
    }

    /// Get the underlying bytes
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; HASH_SIZE] {
        &self.0
    }

    /// Convert to hex string
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from a 64-character hex string
    ///
    /// # Errors
    /// Returns error if hex is invalid or wrong length
    pub fn from_hex(s: &str) -> CryptoResult<Self> {
        let bytes = hex::decode(s).map_err(|e| CryptoError::InvalidHex(e.to_string()))?;
        if bytes.len() != HASH_SIZE {
            return Err(CryptoError::InvalidHash(format!(
                "expected {HASH_SIZE} bytes, got {}",
                bytes.len()
            )));
        }
        let mut arr = [0u8; HASH_SIZE];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }

    /// Whether this is the all-zero hash
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; HASH_SIZE]
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash({})", self.to_hex())
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Serialize for Hash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_hex())
        } else {
            serializer.serialize_bytes(&self.0)
        }
    }
}

impl<'de> Deserialize<'de> for Hash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            Self::from_hex(&s).map_err(serde::de::Error::custom)
        } else {
            let bytes: Vec<u8> = Vec::deserialize(deserializer)?;
            if bytes.len() != HASH_SIZE {
                return Err(serde::de::Error::custom(format!(
                    "hash must be {HASH_SIZE} bytes, got {}",
                    bytes.len()
                )));
            }
            let mut arr = [0u8; HASH_SIZE];
            arr.copy_from_slice(&bytes);
            Ok(Self(arr))
        }
    }
}

/// Hash arbitrary data with BLAKE3
#[must_use]
pub fn hash_data(data: &[u8]) -> Hash {
    Hash(*blake3::hash(data).as_bytes())
}
