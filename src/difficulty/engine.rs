//! Rolling-window difficulty retargeting.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use tracing::debug;

use super::{MAX_BITS, MIN_BASE_BITS, RETARGET_WINDOW};
use crate::types::{Name, Timestamp};
use crate::TARGET_CLAIM_INTERVAL_SECS;

/// Smallest ratio a single retarget may apply (percent)
const MIN_RATIO_PCT: i64 = 75;
/// Largest ratio a single retarget may apply (percent)
const MAX_RATIO_PCT: i64 = 125;

/// The retargeting controller and its persistent state.
///
/// Holds the current base difficulty, the bounded window of the last
/// [`RETARGET_WINDOW`] successful-claim timestamps, and the per-name
/// auction start times. One engine per registry instance; it is owned
/// state, never a process-wide singleton, so independent registries (and
/// tests) cannot interfere with each other.
///
/// Retargeting is a smoothed proportional controller: each adjustment is
/// limited to ±25% and steers the observed claim cadence toward the
/// 600-second target. The computation is order-sensitive on purpose; the
/// window encodes real chronology, so replaying the same ordered history
/// is bit-exact while a permuted history may legitimately differ.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DifficultyEngine {
    /// Current base difficulty, always within `[MIN_BASE_BITS, MAX_BITS]`
    base_bits: u32,
    /// Timestamps of the most recent successful claims, oldest first
    window: VecDeque<Timestamp>,
    /// When each name's repossession auction was first observed
    auction_started: HashMap<Name, Timestamp>,
}

impl DifficultyEngine {
    /// Create an engine with the given starting base difficulty (clamped)
    #[must_use]
    pub fn new(initial_bits: u32) -> Self {
        Self {
            base_bits: initial_bits.clamp(MIN_BASE_BITS, MAX_BITS),
            window: VecDeque::with_capacity(RETARGET_WINDOW),
            auction_started: HashMap::new(),
        }
    }

    /// Current base difficulty bits
    #[must_use]
    pub fn base_bits(&self) -> u32 {
        self.base_bits
    }

    /// Number of samples currently in the window
    #[must_use]
    pub fn window_len(&self) -> usize {
        self.window.len()
    }

    /// Record a successful claim and retarget once the window is full.
    ///
    /// `new_base = clamp(base * ratio / 100)` where
    /// `ratio = clamp(target_interval * 100 / actual_interval, 75..125)`
    /// and `actual_interval` is the floor-average spacing across the
    /// window, clamped to at least one second. Integer arithmetic only.
    pub fn record_claim(&mut self, timestamp: Timestamp) {
        self.window.push_back(timestamp);
        while self.window.len() > RETARGET_WINDOW {
            self.window.pop_front();
        }

        if self.window.len() < RETARGET_WINDOW {
            return;
        }

        // Window is exactly RETARGET_WINDOW entries; both ends exist.
        let newest = *self.window.back().unwrap_or(&timestamp);
        let oldest = *self.window.front().unwrap_or(&timestamp);
        let span = newest - oldest;
        let actual_interval = (span / (RETARGET_WINDOW as i64 - 1)).max(1);

        let ratio = (TARGET_CLAIM_INTERVAL_SECS * 100 / actual_interval)
            .clamp(MIN_RATIO_PCT, MAX_RATIO_PCT);
        let new_base =
            (i64::from(self.base_bits) * ratio / 100).clamp(i64::from(MIN_BASE_BITS), i64::from(MAX_BITS)) as u32;

        if new_base != self.base_bits {
            debug!(
                old_base = self.base_bits,
                new_base,
                actual_interval,
                ratio,
                "retargeted base difficulty"
            );
        }
        self.base_bits = new_base;
    }

    /// When the given name's auction started, if one has been observed
    #[must_use]
    pub fn auction_started_at(&self, name: &Name) -> Option<Timestamp> {
        self.auction_started.get(name).copied()
    }

    /// Record the first observation of a name entering auction.
    ///
    /// Idempotent: later observations keep the original start time, which
    /// anchors the premium decay. Returns the effective start.
    pub fn note_auction_started(&mut self, name: &Name, now: Timestamp) -> Timestamp {
        *self.auction_started.entry(name.clone()).or_insert(now)
    }

    /// Forget a name's auction start (after a successful re-claim)
    pub fn clear_auction(&mut self, name: &Name) {
        self.auction_started.remove(name);
    }
}

impl Default for DifficultyEngine {
    fn default() -> Self {
        Self::new(MIN_BASE_BITS)
    }
}
