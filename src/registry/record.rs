//! Persistent name records.

use serde::{Deserialize, Serialize};

use crate::lifecycle::{resolve_state, LifecycleState};
use crate::types::{Amount, Identity, Name, SurrogateId, Timestamp};

/// A claimed name's persistent record.
///
/// Created on first successful claim, mutated by renewals and by
/// ownership-ledger sync callbacks, and retained (marked `Released`) after
/// release for audit and auction-restart purposes.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NameRecord {
    /// The registered name
    pub name: Name,
    /// Current owner. The zero identity after release
    pub owner: Identity,
    /// When the current ownership began
    pub claimed_at: Timestamp,
    /// When the registration lapses
    pub expires_at: Timestamp,
    /// Stored lifecycle label. Possibly stale: the effective state is
    /// always re-derived via [`NameRecord::state_at`]
    pub state: LifecycleState,
    /// Stable numeric handle, bijective with the name while claimed
    pub surrogate_id: SurrogateId,
    /// Deposit held against this registration
    pub deposit: Amount,
}

impl NameRecord {
    /// The record's effective lifecycle state at `now`
    #[must_use]
    pub fn state_at(&self, now: Timestamp) -> LifecycleState {
        resolve_state(self.state, self.expires_at, now)
    }
}

/// A point-in-time view of a name, resolved lazily from the clock.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NameStatus {
    /// Effective lifecycle state at the query time
    pub state: LifecycleState,
    /// Bits a claim must currently meet; `None` while not reclaimable
    pub required_claim_bits: Option<u32>,
    /// Extra auction bits included in `required_claim_bits`, if any
    pub auction_extra_bits: u32,
    /// Expiry of the live record, if one exists
    pub expires_at: Option<Timestamp>,
    /// Owner of the live record, if one exists
    pub owner: Option<Identity>,
}
