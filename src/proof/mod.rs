//! Proof-of-work verification.
//!
//! A claim proof is a nonce such that
//! `SHA3-256(name ∥ owner ∥ miner ∥ nonce ∥ domain-separator)`, read as a
//! big-endian 256-bit integer, falls strictly below the numeric target for
//! the name's required difficulty.
//!
//! The miner identity is bound into the digest: a solved nonce is valid
//! only for the exact (name, owner, miner) tuple it was found under, so an
//! observer cannot hijack someone else's solution by resubmitting it.
//!
//! Verification is pure and side-effect free. The registry depends only on
//! the [`ProofVerifier`] trait and treats the implementation as
//! substitutable (and admin-replaceable).

use sha3::{Digest, Sha3_256};
use std::fmt;

use crate::crypto::Hash;
use crate::types::{Identity, Name};

/// Domain separator mixed into every proof digest.
///
/// Keeps registry proofs from colliding with any other SHA3-256 use of the
/// same tuple, and versions the digest layout.
pub const PROOF_DOMAIN: &[u8] = b"nameforge/claim-proof/v1";

/// The numeric threshold a proof digest must fall under.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub struct Target(Hash);

impl Target {
    /// The easiest possible target: every digest but all-ones passes
    pub const MAX: Self = Self(Hash::from_bytes([0xff; 32]));

    /// The unreachable target: no digest passes
    pub const ZERO: Self = Self(Hash::ZERO);

    /// Create a target from a raw 256-bit value
    #[must_use]
    pub const fn from_hash(hash: Hash) -> Self {
        Self(hash)
    }

    /// The raw 256-bit threshold
    #[must_use]
    pub const fn as_hash(&self) -> &Hash {
        &self.0
    }

    /// Whether a digest meets this target (strictly below it)
    #[must_use]
    pub fn is_met_by(&self, digest: &Hash) -> bool {
        digest < &self.0
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Verifies claim proofs.
///
/// Implementations must be pure: identical inputs always produce the same
/// digest and verdict.
pub trait ProofVerifier: fmt::Debug + Send {
    /// Compute the binding commitment digest for a proof attempt
    fn compute_hash(&self, name: &Name, owner: &Identity, miner: &Identity, nonce: u64) -> Hash;

    /// Check a proof attempt against a target.
    ///
    /// Returns the verdict together with the digest so callers can log or
    /// audit the attempt without recomputing it.
    fn verify(
        &self,
        name: &Name,
        owner: &Identity,
        miner: &Identity,
        nonce: u64,
        target: &Target,
    ) -> (bool, Hash) {
        let digest = self.compute_hash(name, owner, miner, nonce);
        (target.is_met_by(&digest), digest)
    }
}

/// Production verifier: SHA3-256 over the length-unambiguous field layout.
///
/// SHA3-256 is chosen for cheap verification, not ASIC resistance; proof
/// search cost is governed entirely by the difficulty target.
#[derive(Clone, Copy, Debug, Default)]
pub struct Sha3Verifier;

impl ProofVerifier for Sha3Verifier {
    fn compute_hash(&self, name: &Name, owner: &Identity, miner: &Identity, nonce: u64) -> Hash {
        let mut hasher = Sha3_256::new();
        hasher.update(name.as_str().as_bytes());
        hasher.update(owner.as_bytes());
        hasher.update(miner.as_bytes());
        hasher.update(nonce.to_le_bytes());
        hasher.update(PROOF_DOMAIN);

        let mut out = [0u8; 32];
        out.copy_from_slice(&hasher.finalize());
        Hash::from_bytes(out)
    }
}
