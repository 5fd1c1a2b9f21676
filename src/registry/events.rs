//! Events emitted by successful registry mutations.

use serde::{Deserialize, Serialize};

use crate::crypto::Hash;
use crate::types::{Amount, Identity, Name, SurrogateId, Timestamp};

/// A committed registry mutation.
///
/// Every successful mutating operation emits exactly one event; rejected
/// operations emit none. Events are serde-serializable so external
/// collaborators (indexers, the ownership ledger, economic modules) can
/// consume them verbatim.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum RegistryEvent {
    /// A name was claimed (first claim or auction repossession)
    Claimed {
        /// The claimed name
        name: Name,
        /// New owner
        owner: Identity,
        /// Surrogate handle allocated or retained for the name
        surrogate_id: SurrogateId,
        /// Registration expiry
        expires_at: Timestamp,
        /// Deposit now held
        deposit: Amount,
        /// The winning proof digest
        proof_digest: Hash,
        /// Whether this claim repossessed an auctioned name
        repossession: bool,
    },
    /// An active or in-grace name was renewed by its owner
    Renewed {
        /// The renewed name
        name: Name,
        /// Owner who renewed
        owner: Identity,
        /// New expiry
        expires_at: Timestamp,
        /// Additional deposit now held
        deposit_added: Amount,
        /// The winning proof digest
        proof_digest: Hash,
    },
    /// An owner released their name back to the open pool
    Released {
        /// The released name
        name: Name,
        /// Previous owner
        owner: Identity,
        /// Deposit refunded in full
        refunded: Amount,
    },
    /// The ownership ledger reported a transfer for a surrogate id
    OwnerSynced {
        /// The affected name
        name: Name,
        /// Surrogate handle the ledger reported on
        surrogate_id: SurrogateId,
        /// Owner before the sync
        previous_owner: Identity,
        /// Owner after the sync
        new_owner: Identity,
    },
}
