//! Name difficulty model and cadence retargeting.
//!
//! Two layers:
//! - the **model** maps a name and the current base difficulty to the
//!   required difficulty bits and numeric target (shorter and digits-only
//!   names cost more);
//! - the **engine** retargets the base difficulty from a rolling window of
//!   successful-claim timestamps, steering the observed claim cadence
//!   toward one claim per [`crate::TARGET_CLAIM_INTERVAL_SECS`].
//!
//! All arithmetic is integer-only with truncating division, so replaying
//! the same ordered claim history always reproduces the same base value.

mod engine;

pub use engine::DifficultyEngine;

use crate::crypto::Hash;
use crate::proof::Target;
use crate::types::Name;

/// Lowest allowed base difficulty
pub const MIN_BASE_BITS: u32 = 16;

/// Highest allowed difficulty (base or final)
pub const MAX_BITS: u32 = 240;

/// Number of claim timestamps in the retargeting window
pub const RETARGET_WINDOW: usize = 24;

/// Additive difficulty weight for a name's length.
///
/// Shorter names are exponentially more expensive: each extra 8 bits
/// doubles the expected search work 256-fold.
#[must_use]
pub fn length_weight(len: usize) -> u32 {
    match len {
        0..=3 => 32,
        4 => 24,
        5 => 16,
        6 => 8,
        _ => 0,
    }
}

/// Additive difficulty weight for a name's character classes.
///
/// Digits-only names (phone-number-like) and letters-only names
/// (dictionary-word-like) are scarcer than mixed ones.
#[must_use]
pub fn charset_weight(name: &Name) -> u32 {
    if name.is_digits_only() {
        8
    } else if name.is_letters_only() {
        4
    } else {
        0
    }
}

/// Required difficulty bits for a name at a given base difficulty.
///
/// `base + length_weight + charset_weight`, capped at [`MAX_BITS`].
#[must_use]
pub fn difficulty_bits(name: &Name, base_bits: u32) -> u32 {
    (base_bits + length_weight(name.len()) + charset_weight(name)).min(MAX_BITS)
}

/// Numeric target for a difficulty: `(2^256 − 1) >> bits`.
///
/// 256 or more bits yields the zero target, which no digest can meet.
#[must_use]
pub fn target_from_bits(bits: u32) -> Target {
    if bits >= 256 {
        return Target::ZERO;
    }

    let mut out = [0xffu8; 32];
    let byte_shift = (bits / 8) as usize;
    let bit_shift = bits % 8;

    for byte in out.iter_mut().take(byte_shift) {
        *byte = 0;
    }
    if bit_shift > 0 {
        out[byte_shift] = 0xff >> bit_shift;
    }

    Target::from_hash(Hash::from_bytes(out))
}
