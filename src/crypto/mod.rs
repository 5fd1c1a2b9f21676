//! Cryptographic primitives for the registry.
//!
//! - BLAKE3 for fast general-purpose hashing (identity derivation)
//! - SHA3-256 for the proof commitment digest (see [`crate::proof`])

mod hash;

pub use hash::{hash_data, Hash};

use thiserror::Error;

/// Cryptographic errors
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Invalid hash format
    #[error("invalid hash: {0}")]
    InvalidHash(String),
    /// Invalid hex encoding
    #[error("invalid hex encoding: {0}")]
    InvalidHex(String),
}

/// Result type for crypto operations
pub type CryptoResult<T> = Result<T, CryptoError>;
