//! Name lifecycle resolution and auction pricing.
//!
//! There is no background scheduler. A name's effective state is derived
//! lazily from `(stored state, expiry, now)` on every read and every
//! mutating call, so transitions "happen" at the instant someone looks.
//!
//! State graph:
//!
//! ```text
//! Available ──claim──> Active ──expiry──> (Expired) ──> GracePeriod
//!     ^                  │                                   │
//!     │               release                             +90 days
//!     │                  v                                   v
//!     └──────────── Released          Auction <──────────────┘
//!                                        │
//!                                     re-claim ──> Active
//! ```
//!
//! `Expired` exists only as a bookkeeping label: any evaluation that would
//! report it resolves onward to `GracePeriod` in the same call, so it is
//! never externally observable.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::difficulty::MAX_BITS;
use crate::types::Timestamp;
use crate::DAY_SECS;

/// Owner-only renewal window after expiry (90 days)
pub const GRACE_PERIOD_SECS: i64 = 90 * DAY_SECS;

/// Auction premium at hour zero, in tenth-of-a-bit units (90 extra bits)
pub const AUCTION_PREMIUM_UNITS: i64 = 900;

/// Premium units shed per elapsed auction hour
pub const AUCTION_DECAY_UNITS_PER_HOUR: i64 = 20;

/// Tenth-of-a-bit units per difficulty bit
const UNITS_PER_BIT: i64 = 10;

/// A name's lifecycle state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifecycleState {
    /// Never claimed, or the record slot is open; claimable
    Available,
    /// Claimed and before expiry
    Active,
    /// Past expiry. Internal label only: resolution collapses it to
    /// `GracePeriod` within the same evaluation
    Expired,
    /// Past expiry, within the owner-only renewal window
    GracePeriod,
    /// Past the grace period; publicly contestable at a decaying premium
    Auction,
    /// Explicitly released by its owner; claimable
    Released,
}

impl LifecycleState {
    /// Whether a claim may target a name in this state
    #[must_use]
    pub fn is_reclaimable(self) -> bool {
        matches!(self, Self::Available | Self::Released | Self::Auction)
    }

    /// Whether the current owner may renew in this state
    #[must_use]
    pub fn can_renew(self) -> bool {
        matches!(self, Self::Active | Self::GracePeriod)
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Available => "available",
            Self::Active => "active",
            Self::Expired => "expired",
            Self::GracePeriod => "grace-period",
            Self::Auction => "auction",
            Self::Released => "released",
        };
        write!(f, "{s}")
    }
}

/// Resolve a record's effective state at `now`.
///
/// Pure function of its inputs. `Available` and `Released` are sticky
/// until an explicit claim; every other stored label is re-derived from
/// the expiry clock, so stale stored states self-heal on the next look.
#[must_use]
pub fn resolve_state(
    stored: LifecycleState,
    expires_at: Timestamp,
    now: Timestamp,
) -> LifecycleState {
    match stored {
        LifecycleState::Available | LifecycleState::Released => stored,
        _ => {
            if now <= expires_at {
                LifecycleState::Active
            } else if now <= expires_at + GRACE_PERIOD_SECS {
                // Expired collapses to GracePeriod in the same evaluation
                LifecycleState::GracePeriod
            } else {
                LifecycleState::Auction
            }
        }
    }
}

/// Extra difficulty bits demanded while a name sits in auction.
///
/// The premium starts at 90 bits and decays linearly, 2 bits per hour,
/// reaching zero from hour 45 on. The decay is the declared linear
/// approximation of a log-like curve; the literal piecewise formula is
/// normative.
#[must_use]
pub fn auction_extra_bits(auction_started_at: Timestamp, now: Timestamp) -> u32 {
    let hours_elapsed = ((now - auction_started_at) / 3_600).max(0);
    let units = (AUCTION_PREMIUM_UNITS - AUCTION_DECAY_UNITS_PER_HOUR * hours_elapsed).max(0);
    (units / UNITS_PER_BIT) as u32
}

/// Punitive renewal difficulty: `bits * (100 + 10*years) / 100`, capped.
///
/// Renewing for longer terms costs proportionally more work, which keeps
/// indefinite squatting expensive.
#[must_use]
pub fn renewal_bits(name_bits: u32, years: u32) -> u32 {
    (name_bits * (100 + 10 * years) / 100).min(MAX_BITS)
}
